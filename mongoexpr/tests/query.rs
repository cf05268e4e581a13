use mongoexpr::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_query_documents() -> ExprResult<()> {
    let query = Query::builder()
        .filter(Filter::new().field("qty").gt(4)?)
        .project(Projection::new().select("item"))
        .update(UpdateAction::new().inc("qty", -1, false))
        .sort("qty", "desc".parse()?)
        .sort("item", SortDirection::Asc)
        .limit(5)
        .skip(10)
        .build();

    assert_eq!(query.filter_document(), doc! { "qty": { "$gt": 4 } });
    assert_eq!(query.projection_document(), Some(doc! { "item": 1 }));
    assert_eq!(query.update_document(), Some(doc! { "$inc": { "qty": -1 } }));
    assert_eq!(query.sort_document(), doc! { "qty": -1, "item": 1 });
    assert_eq!(
        query.sort_document().keys().map(String::as_str).collect::<Vec<_>>(),
        ["qty", "item"]
    );
    assert_eq!((query.limit, query.skip), (5, 10));

    Ok(())
}

#[test]
fn test_invalid_sort_direction() {
    let err = "up".parse::<SortDirection>().unwrap_err();
    assert_eq!(err, ExprError::InvalidDirection("up".to_string()));
    assert_eq!(SortDirection::Desc.to_string(), "desc");
}
