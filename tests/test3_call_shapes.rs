use sql_command::prelude::*;
use sql_command::test_utils::{MockDriver, MockResponse, create_test_row, int_set};
use tokio::runtime::Runtime;

fn people() -> ResultSet {
    ResultSet::with_columns(["id", "name"])
        .row(vec![DbValue::I64(1), DbValue::from("Ada")])
        .row(vec![DbValue::I64(2), DbValue::from("Grace")])
}

#[test]
fn scalar_single_and_list_decode_into_caller_types() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        mock.push_response(MockResponse::Scalar(DbValue::I64(42)))
            .push_response(MockResponse::Scalar(DbValue::Null))
            .push_response(MockResponse::Rows(
                ResultSet::with_columns(["id", "name"]).row(vec![DbValue::I64(7), "Linus".into()]),
            ))
            .push_response(MockResponse::Rows(ResultSet::with_columns(["id", "name"])))
            .push_response(MockResponse::Rows(people()));
        let mut conn = Connector::new(mock.clone());

        let count = conn.execute_scalar::<i32>(&mut Command::text("select count(*)")).await?;
        assert_eq!(count.data, Some(42));

        let missing = conn.execute_scalar::<i32>(&mut Command::text("select null")).await?;
        assert_eq!(missing.data, None);

        let one = conn
            .query_single::<(i64, String)>(&mut Command::text("select id, name"))
            .await?;
        assert_eq!(one.data, Some((7, "Linus".to_string())));

        let none = conn.query_single::<DbRow>(&mut Command::text("select id, name")).await?;
        assert!(none.data.is_none());

        let all = conn.query::<DbRow>(&mut Command::text("select id, name")).await?;
        let names: Vec<_> = all
            .data
            .iter()
            .map(|row| row.get("name").and_then(DbValue::as_text).map(str::to_owned))
            .collect();
        assert_eq!(names, vec![Some("Ada".to_string()), Some("Grace".to_string())]);

        assert_eq!(mock.stats().opens, 5);
        assert_eq!(mock.stats().closes, 5);
        conn.dispose().await?;
        Ok(())
    })
}

#[test]
fn single_row_query_rejects_extra_rows() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        mock.push_response(MockResponse::Rows(people()));
        let mut conn = Connector::new(mock.clone());

        let err = conn
            .query_single::<DbRow>(&mut Command::text("select id, name"))
            .await
            .unwrap_err();
        assert!(matches!(err, SqlCommandError::MultipleRows { rows: 2 }));
        assert!(err.is_shape_mismatch());
        assert_eq!(conn.state(), LifecycleState::Closed);
        conn.dispose().await?;
        Ok(())
    })
}

#[test]
fn return_value_is_reported_for_every_shape() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        mock.set_return_code(-1_i32);
        mock.push_response(MockResponse::Affected(0))
            .push_response(MockResponse::Scalar(DbValue::I32(5)))
            .push_response(MockResponse::Rows(int_set(&[9])))
            .push_response(MockResponse::Rows(int_set(&[1, 2, 3])))
            .push_response(MockResponse::Sets(vec![int_set(&[1]), int_set(&[2])]))
            .push_response(MockResponse::Sets(vec![int_set(&[1])]));
        let mut conn = Connector::new(mock.clone());
        let proc = || Command::procedure("dbo.Work");

        assert_eq!(conn.execute(&mut proc()).await?.return_value, -1);
        assert_eq!(conn.execute_scalar::<i32>(&mut proc()).await?.return_value, -1);
        assert_eq!(conn.query_single::<i64>(&mut proc()).await?.return_value, -1);
        assert_eq!(conn.query::<i64>(&mut proc()).await?.return_value, -1);
        let multi = conn.query_multiple::<(Vec<i64>, Vec<i64>)>(&mut proc()).await?;
        assert_eq!(multi.return_value, -1);
        assert_eq!(conn.query_dynamic(&mut proc()).await?.return_value, -1);

        // the return slot is added for the driver but not left on the caller's command
        let sent = &mock.executed()[0].parameters;
        assert_eq!(sent.names(), vec!["@RETURN_VALUE".to_string()]);
        assert_eq!(sent[0].direction, ParameterDirection::ReturnValue);
        let mut cmd = proc();
        mock.push_response(MockResponse::Affected(0));
        conn.execute(&mut cmd).await?;
        assert!(cmd.parameters.is_empty());

        conn.dispose().await?;
        Ok(())
    })
}

#[test]
fn return_value_defaults_to_zero() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        let mut conn = Connector::new(mock.clone());

        // requested but the driver never wrote it
        let res = conn.execute(&mut Command::procedure("dbo.Quiet")).await?;
        assert_eq!(res.return_value, 0);

        // text commands do not request one unless asked
        mock.set_return_code(7_i32);
        let res = conn.execute(&mut Command::text("exec dbo.Quiet")).await?;
        assert_eq!(res.return_value, 0);
        assert!(mock.executed()[1].parameters.is_empty());

        let res = conn
            .execute(&mut Command::text("exec dbo.Quiet").return_value(true))
            .await?;
        assert_eq!(res.return_value, 7);

        let res = conn
            .execute(&mut Command::procedure("dbo.Quiet").return_value(false))
            .await?;
        assert_eq!(res.return_value, 0);
        conn.dispose().await?;
        Ok(())
    })
}

#[test]
fn custom_return_value_name_is_used() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        mock.set_return_code(3_i32);
        let options = ConnectorOptions::builder()
            .return_value_parameter_name("@rc")
            .finish()?;
        let mut conn = Connector::with_options(mock.clone(), options)?;

        let res = conn.execute(&mut Command::procedure("p")).await?;
        assert_eq!(res.return_value, 3);
        assert_eq!(mock.executed()[0].parameters.names(), vec!["@rc".to_string()]);

        let res = conn
            .execute(&mut Command::procedure("p").return_value_name("@status"))
            .await?;
        assert_eq!(res.return_value, 3);
        assert_eq!(mock.executed()[1].parameters.names(), vec!["@status".to_string()]);
        conn.dispose().await?;
        Ok(())
    })
}

#[test]
fn rows_convert_to_maps_and_json() -> Result<(), Box<dyn std::error::Error>> {
    let row = create_test_row(
        vec!["id".into(), "name".into(), "score".into()],
        vec![DbValue::I32(3), DbValue::from("Edsger"), DbValue::Null],
    );
    let (id, name, score) = <(i32, String, Option<f64>)>::from_db_row(&row)?;
    assert_eq!((id, name.as_str(), score), (3, "Edsger", None));

    let map = row.to_map();
    assert_eq!(map.get("id"), Some(&DbValue::I32(3)));
    assert_eq!(
        row.to_json(),
        serde_json::json!({ "id": 3, "name": "Edsger", "score": null })
    );
    Ok(())
}

#[test]
fn caller_declared_return_slot_receives_the_code() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockDriver::new();
        mock.set_return_code(-2_i32);
        let mut conn = Connector::new(mock.clone());

        let mut cmd = Command::procedure("p").param(Parameter::return_value("@status"));
        let res = conn.execute(&mut cmd).await?;
        assert_eq!(res.return_value, -2);
        assert_eq!(mock.executed()[0].parameters.names(), vec!["@status".to_string()]);

        let mut cmd = Command::procedure("p")
            .param(Parameter::return_value("@a"))
            .param(Parameter::return_value("@b"));
        let err = conn.execute(&mut cmd).await.unwrap_err();
        assert!(matches!(err, SqlCommandError::AmbiguousParameter { .. }));
        assert_eq!(mock.executed().len(), 1);
        conn.dispose().await?;
        Ok(())
    })
}
