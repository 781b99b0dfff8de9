mod common;

use anyhow::Result;
use axum::http::Method;
use serde_json::{json, Value};

use common::StubBackend;
use tienda_admin::gate::{AutoAnswer, ConfirmationGate, Guard};
use tienda_admin::list::ListController;
use tienda_admin::mutation::{self, ActionOutcome, MutationController};
use tienda_admin::resource::catalog::{NO_CATEGORY, PRODUCTS};
use tienda_admin::resource::RecordId;

#[tokio::test]
async fn edit_keeps_price_and_stock_as_strings() -> Result<()> {
    let backend = StubBackend::seeded().await?;
    let mut form = MutationController::edit(backend.client()?, &PRODUCTS, RecordId::from(7)).await?;
    form.set_field("precio", "19.99")?;
    form.set_field("stock", "0")?;
    form.submit().await?;

    let payload = backend.seen(Method::PUT, "productos/7/")[0].body.clone().unwrap_or_default();
    assert_eq!(payload["precio"], json!("19.99"));
    assert_eq!(payload["stock"], json!("0"));
    assert_eq!(payload["categoria"], json!(1));
    assert_eq!(payload["nombre_prod"], json!("Silla plegable"));
    Ok(())
}

#[tokio::test]
async fn nested_category_is_sent_as_its_id() -> Result<()> {
    let backend = StubBackend::seeded().await?;
    let mut form = MutationController::edit(backend.client()?, &PRODUCTS, RecordId::from(8)).await?;
    assert_eq!(form.draft().text("categoria"), "2");
    form.set_field("descripcion", "Para 4 personas")?;
    form.submit().await?;

    let payload = backend.seen(Method::PUT, "productos/8/")[0].body.clone().unwrap_or_default();
    assert_eq!(payload["categoria"], json!(2));
    Ok(())
}

#[tokio::test]
async fn search_covers_name_and_resolved_category() -> Result<()> {
    let backend = StubBackend::seeded().await?;
    let mut list = ListController::new(backend.client()?, &PRODUCTS);
    list.load().await?;

    assert!(list.search("").is_empty());
    let by_category: Vec<String> = list.search("SILLAS").iter().map(|r| r.text("nombre_prod")).collect();
    assert_eq!(by_category, vec!["Silla plegable"]);
    let by_nested: Vec<String> = list.search("mesas").iter().map(|r| r.text("nombre_prod")).collect();
    assert_eq!(by_nested, vec!["Mesa redonda"]);
    assert_eq!(list.search("cop").len(), 1);

    let copa = list.find(&RecordId::from(9)).cloned().unwrap_or_default();
    assert_eq!(list.relation_name(&copa).as_deref(), Some(NO_CATEGORY));
    Ok(())
}

#[tokio::test]
async fn create_requires_category() -> Result<()> {
    let backend = StubBackend::seeded().await?;
    let mut list = ListController::new(backend.client()?, &PRODUCTS);
    list.load().await?;
    let mut form = MutationController::new_create(backend.client()?, &PRODUCTS);
    form.set_field("nombre_prod", "Mantel")?;
    form.set_field("precio", "5")?;
    form.set_field("stock", "10")?;

    assert!(form.submit().await.is_err());
    assert!(backend.seen(Method::POST, "productos/").is_empty());

    form.set_field("categoria", "2")?;
    let created = form.submit_and_reload(&mut list).await?;
    assert_eq!(created["categoria"], json!(2));
    assert_eq!(created["precio"], json!("5"));
    assert_eq!(list.search("mantel").len(), 1);
    Ok(())
}

#[tokio::test]
async fn delete_reloads_and_products_are_unguarded() -> Result<()> {
    let backend = StubBackend::seeded().await?;
    let guard = Guard::new("briadmin", None);
    let yes = AutoAnswer(true);
    let gate = ConfirmationGate::new(&guard, &yes);
    let mut list = ListController::new(backend.client()?, &PRODUCTS);
    list.load().await?;

    let outcome = mutation::delete_record(&mut list, &gate, &RecordId::from(9)).await?;
    assert_eq!(outcome, ActionOutcome::Completed);
    assert_eq!(list.records().len(), 2);
    assert!(list.find(&RecordId::from(9)).is_none());
    assert_eq!(backend.seen(Method::DELETE, "productos/9/")[0].body, None::<Value>);
    Ok(())
}
