use stockalerts::{
    models::Direction,
    services::command::{parse, AlertCommand, CommandError},
};

#[test]
fn empty_text_lists_alerts() {
    assert_eq!(parse(""), Ok(AlertCommand::List));
    assert_eq!(parse("   "), Ok(AlertCommand::List));
}

#[test]
fn symbol_and_price_create_without_direction() {
    assert_eq!(
        parse("aapl 150"),
        Ok(AlertCommand::Upsert {
            symbol: "AAPL".to_string(),
            price: 150.0,
            direction: None,
            notify_target: String::new(),
        })
    );
}

#[test]
fn tokens_can_come_in_any_order_and_case() {
    assert_eq!(
        parse("#Trading BELOW 99.5 msft"),
        Ok(AlertCommand::Upsert {
            symbol: "MSFT".to_string(),
            price: 99.5,
            direction: Some(Direction::Below),
            notify_target: "Trading".to_string(),
        })
    );
}

#[test]
fn dollar_sign_is_accepted_on_price() {
    match parse("TSLA $210.25 above") {
        Ok(AlertCommand::Upsert { price, direction, .. }) => {
            assert_eq!(price, 210.25);
            assert_eq!(direction, Some(Direction::Above));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn delete_only_needs_a_symbol() {
    assert_eq!(parse("aapl delete"), Ok(AlertCommand::Delete { symbol: "AAPL".to_string() }));
    assert_eq!(parse("DELETE aapl 150 below"), Ok(AlertCommand::Delete { symbol: "AAPL".to_string() }));
}

#[test]
fn deleteall_wins_over_everything_else() {
    assert_eq!(parse("deleteall"), Ok(AlertCommand::DeleteAll));
    assert_eq!(parse("AAPL 150 delete DeleteAll"), Ok(AlertCommand::DeleteAll));
}

#[test]
fn bad_input_is_reported() {
    assert_eq!(parse("AAPL 15o.x"), Err(CommandError::InvalidPrice("15o.x".to_string())));
    assert_eq!(parse("150 above"), Err(CommandError::MissingSymbol));
    assert_eq!(parse("delete"), Err(CommandError::MissingSymbol));
    assert_eq!(parse("AAPL above"), Err(CommandError::MissingPrice("AAPL".to_string())));
}

#[test]
fn channel_with_digits_is_not_a_price() {
    match parse("AAPL 150 #desk2") {
        Ok(AlertCommand::Upsert { price, notify_target, .. }) => {
            assert_eq!(price, 150.0);
            assert_eq!(notify_target, "desk2");
        }
        other => panic!("unexpected {other:?}"),
    }
}
