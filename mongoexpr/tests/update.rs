use mongoexpr::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_field_operators() {
    let update = UpdateAction::new()
        .inc("quantity", -2, false)
        .inc("metrics.orders", 1, false)
        .set("grades", 82, true)
        .mul("price", 1.25, false);

    assert_eq!(
        update.to_document(),
        doc! {
            "$inc": { "quantity": -2, "metrics.orders": 1 },
            "$set": { "grades.$": 82 },
            "$mul": { "price": 1.25 },
        }
    );
}

#[test]
fn test_operators_keep_insertion_order() {
    let update = UpdateAction::new()
        .set("status", "A", false)
        .inc("qty", 2, false)
        .set("size.uom", "cm", false)
        .set("status", "D", false);

    assert_eq!(
        serde_json::to_string(&update).unwrap(),
        r#"{"$set":{"status":"D","size.uom":"cm"},"$inc":{"qty":2}}"#
    );
}

#[test]
fn test_push_with_modifiers() {
    let update = UpdateAction::new().push_operator(
        "scores",
        Push::each_of([50, 60, 70])
            .slice(-3)
            .sort(SortDirection::Asc)
            .position(0),
        false,
    );

    assert_eq!(
        update.to_document(),
        doc! {
            "$push": {
                "scores": { "$each": [50, 60, 70], "$slice": -3, "$sort": 1, "$position": 0 },
            },
        }
    );
    assert_eq!(
        serde_json::to_string(&update).unwrap(),
        r#"{"$push":{"scores":{"$each":[50,60,70],"$slice":-3,"$sort":1,"$position":0}}}"#
    );
}

#[test]
fn test_push_without_each_ignores_modifiers() {
    let update = UpdateAction::new().push_operator("scores", Push::new(89).slice(3), false);
    assert_eq!(update.to_document(), doc! { "$push": { "scores": 89 } });
}

#[test]
fn test_add_to_set_array_value_without_each() {
    let update = UpdateAction::new().add_to_set("letters", vec!["c", "d"], false);
    assert_eq!(update.to_document(), doc! { "$addToSet": { "letters": ["c", "d"] } });
}

#[test]
fn test_pull_with_condition() -> ExprResult<()> {
    let condition = Filter::nested().field("score").eq(8)?.field("item").eq("B")?;
    let update = UpdateAction::new().pull_matching("results", condition, false);

    assert_eq!(
        update.to_document(),
        doc! { "$pull": { "results": { "score": { "$eq": 8 }, "item": { "$eq": "B" } } } }
    );

    Ok(())
}

#[test]
fn test_pop_last() {
    let update = UpdateAction::new().pop("scores", PopFrom::Last, false);
    assert_eq!(update.to_document(), doc! { "$pop": { "scores": 1 } });
}

#[test]
fn test_bitwise() -> ExprResult<()> {
    let update = UpdateAction::new()
        .bitwise("expdata", BitwiseOp::Or, 5, false)
        .bit("flags", "and", 1, false)?;

    assert_eq!(
        update.to_document(),
        doc! { "$bit": { "expdata": { "or": 5 }, "flags": { "and": 1 } } }
    );
    assert_eq!("xor".parse::<BitwiseOp>()?, BitwiseOp::Xor);
    assert!(matches!(
        UpdateAction::new().bit("flags", "not", 1, false),
        Err(ExprError::InvalidOperator(_))
    ));

    Ok(())
}

#[test]
fn test_isolated_multi_update() {
    let update = UpdateAction::new()
        .set("status", "closed", false)
        .isolated(true);

    assert_eq!(update.to_document(), doc! { "$set": { "status": "closed" }, "$isolated": 1 });
}

#[test]
fn test_empty_update() {
    let update = UpdateAction::new();
    assert!(update.is_empty());
    assert_eq!(Document::from(update), doc! {});
}
