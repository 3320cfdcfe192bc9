use sql_command::prelude::*;
use sql_command::test_utils::MockDriver;
use tokio::runtime::Runtime;

#[test]
fn rollback_discards_every_command_on_one_connection() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        let mut conn = Connector::new(mock.clone());

        conn.begin_transaction().await?;
        assert_eq!(conn.state(), LifecycleState::OpenForTransaction);
        conn.execute(&mut Command::text("insert into t values (1)")).await?;
        conn.execute(&mut Command::text("insert into t values (2)")).await?;
        assert_eq!(conn.state(), LifecycleState::OpenForTransaction);
        conn.rollback().await?;

        let stats = mock.stats();
        assert_eq!(stats.opens, 1);
        assert_eq!(stats.closes, 0);
        assert_eq!(stats.rollbacks, 1);
        assert_eq!(stats.disposed_transactions, 1);
        assert!(mock.visible_effects().is_empty());

        let token = mock.executed()[0].transaction;
        assert!(token.is_some());
        assert!(mock.executed().iter().all(|c| c.transaction == token));

        // the connection stays open for later calls and transactions until dispose
        assert_eq!(conn.state(), LifecycleState::OpenIdle);
        conn.execute(&mut Command::text("insert into t values (3)")).await?;
        assert_eq!(conn.state(), LifecycleState::OpenIdle);
        assert!(mock.is_connected());
        assert_eq!(mock.visible_effects(), vec!["insert into t values (3)".to_string()]);
        assert_eq!(mock.executed()[2].transaction, None);

        conn.begin_transaction().await?;
        conn.execute(&mut Command::text("insert into t values (4)")).await?;
        conn.commit().await?;
        assert_eq!(mock.stats().opens, 1);
        assert_eq!(mock.stats().closes, 0);

        conn.dispose().await?;
        assert_eq!(mock.stats().closes, 1);
        Ok(())
    })
}

#[test]
fn commit_makes_work_visible() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        let mut conn = Connector::new(mock.clone());

        conn.begin_transaction().await?;
        conn.execute(&mut Command::text("insert into t values (1)")).await?;
        assert!(mock.visible_effects().is_empty());
        conn.commit().await?;
        assert_eq!(mock.visible_effects(), vec!["insert into t values (1)".to_string()]);
        assert!(!conn.in_transaction());

        // committed transaction object is released by the next begin
        assert_eq!(mock.stats().disposed_transactions, 0);
        conn.begin_transaction().await?;
        assert_eq!(mock.stats().disposed_transactions, 1);
        assert_eq!(mock.stats().begins, 2);
        assert_eq!(mock.stats().opens, 1);
        conn.commit().await?;

        conn.dispose().await?;
        let stats = mock.stats();
        assert_eq!(stats.disposed_transactions, 2);
        assert_eq!(stats.closes, 1);
        assert_eq!(stats.disposes, 1);
        Ok(())
    })
}

#[test]
fn begin_while_active_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        let mut conn = Connector::new(mock.clone());
        conn.begin_transaction().await?;
        conn.begin_transaction().await?;
        assert_eq!(mock.stats().begins, 1);
        conn.commit().await?;
        conn.dispose().await?;
        Ok(())
    })
}

#[test]
fn commit_or_rollback_without_transaction_fails() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut conn = Connector::new(MockDriver::new());
        assert!(matches!(conn.commit().await, Err(SqlCommandError::Transaction(_))));
        assert!(matches!(conn.rollback().await, Err(SqlCommandError::Transaction(_))));
        conn.dispose().await?;
        Ok(())
    })
}

#[test]
fn dispose_abandons_uncommitted_work_without_rollback() -> Result<(), Box<dyn std::error::Error>>
{
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        let mut conn = Connector::new(mock.clone());
        conn.begin_transaction().await?;
        conn.execute(&mut Command::text("delete from t")).await?;
        conn.dispose().await?;

        let stats = mock.stats();
        assert_eq!(stats.rollbacks, 0);
        assert_eq!(stats.disposed_transactions, 1);
        assert_eq!(stats.closes, 1);
        assert!(mock.visible_effects().is_empty());
        assert!(!mock.is_connected());
        Ok(())
    })
}
