//! Re-parenting with a small traversal bound. Skipped without DATABASE_URL.

use anyhow::Result;
use exhibit_api::database::models::{CatalogPatch, NewCatalog, NewExhibition};
use exhibit_api::database::{DatabaseError, DatabaseManager};
use exhibit_api::services::{CatalogService, ExhibitionService};

fn catalog(name: &str, pid: i64) -> NewCatalog {
    NewCatalog {
        pid,
        name: name.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn move_of_subtree_deeper_than_bound_is_refused() -> Result<()> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping");
        return Ok(());
    }
    // Read once by the config singleton; this test binary is its own process.
    std::env::set_var("CATALOG_MAX_DEPTH", "2");
    DatabaseManager::migrate().await?;

    let eid = ExhibitionService::new()
        .await?
        .create(NewExhibition {
            title: format!("bound-{}", uuid::Uuid::new_v4()),
            ..Default::default()
        })
        .await?
        .id;
    let catalogs = CatalogService::new().await?;

    // a -> b -> c -> e is three levels below a
    let a = catalogs.create(eid, catalog("a", 0)).await?;
    let b = catalogs.create(eid, catalog("b", a.id)).await?;
    let c = catalogs.create(eid, catalog("c", b.id)).await?;
    let e = catalogs.create(eid, catalog("e", c.id)).await?;
    let d = catalogs.create(eid, catalog("d", 0)).await?;

    let move_a = CatalogPatch {
        pid: Some(d.id),
        ..Default::default()
    };
    assert!(matches!(catalogs.update(a.id, eid, move_a).await, Err(DatabaseError::Invalid(_))));
    assert_eq!(catalogs.get(a.id, eid).await?.pid, 0);
    assert_eq!(catalogs.get(e.id, eid).await?.root_id, a.id);

    // Two levels fit inside the bound
    let move_b = CatalogPatch {
        pid: Some(d.id),
        ..Default::default()
    };
    let moved = catalogs.update(b.id, eid, move_b).await?;
    assert_eq!(moved.root_id, d.id);
    assert_eq!(catalogs.get(e.id, eid).await?.root_id, d.id);

    Ok(())
}
