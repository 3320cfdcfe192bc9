use sql_command::ConnectionSession;
use sql_command::prelude::*;
use sql_command::test_utils::{MockDriver, MockResponse, init_tracing, int_set};
use tokio::runtime::Runtime;

#[test]
fn each_call_opens_and_closes_its_own_connection() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        mock.push_response(MockResponse::Affected(3))
            .push_response(MockResponse::Rows(int_set(&[1, 2])));
        let mut conn = Connector::new(mock.clone());
        assert_eq!(conn.state(), LifecycleState::Closed);

        let res = conn.execute(&mut Command::text("update t set x = 1")).await?;
        assert_eq!(res.data, 3);
        assert_eq!(res.rows_affected, Some(3));
        assert_eq!(conn.state(), LifecycleState::Closed);

        let rows = conn.query::<i64>(&mut Command::text("select n from t")).await?;
        assert_eq!(rows.data, vec![1, 2]);
        assert_eq!(conn.state(), LifecycleState::Closed);

        let stats = mock.stats();
        assert_eq!(stats.opens, 2);
        assert_eq!(stats.closes, 2);
        conn.dispose().await?;
        Ok(())
    })
}

#[test]
fn session_acquire_twice_opens_once_and_release_without_scope_is_noop()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        let mut session = ConnectionSession::new(mock.clone());
        session.release_for_call().await?;
        assert_eq!(mock.stats().closes, 0);

        session.acquire_for_call().await?;
        session.acquire_for_call().await?;
        assert_eq!(mock.stats().opens, 1);
        assert_eq!(session.state(), LifecycleState::OpenForQuery);

        session.release_for_call().await?;
        session.release_for_call().await?;
        assert_eq!(mock.stats().closes, 1);
        assert_eq!(session.state(), LifecycleState::Closed);
        Ok(())
    })
}

#[test]
fn dispose_is_idempotent_and_blocks_further_calls() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        let mut conn = Connector::new(mock.clone());
        conn.dispose().await?;
        conn.dispose().await?;
        assert_eq!(mock.stats().disposes, 1);
        assert_eq!(conn.state(), LifecycleState::Disposed);

        let err = conn.execute(&mut Command::text("select 1")).await.unwrap_err();
        assert!(matches!(err, SqlCommandError::Disposed));
        assert_eq!(mock.stats().opens, 0);
        Ok(())
    })
}

#[test]
fn failed_open_is_a_connection_error() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        mock.fail_next_open("server unreachable");
        let mut conn = Connector::new(mock.clone());

        let err = conn.execute(&mut Command::text("select 1")).await.unwrap_err();
        assert!(matches!(err, SqlCommandError::Connection { operation: "open", .. }));
        assert!(err.is_driver_error());
        assert_eq!(conn.state(), LifecycleState::Closed);

        // the next call gets a fresh attempt
        conn.execute(&mut Command::text("select 1")).await?;
        assert_eq!(mock.stats().opens, 1);
        conn.dispose().await?;
        Ok(())
    })
}
