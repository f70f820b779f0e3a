//! SeaORM adapter against in-memory SQLite.

use users::contract::model::NewUser;
use users::domain::repo::{SaveError, UsersRepository, UsersStore};
use users::infra::db;
use users::infra::storage::sea_orm_repo::SeaOrmUsersRepository;

async fn repo() -> SeaOrmUsersRepository<sea_orm::DatabaseConnection> {
    SeaOrmUsersRepository::from_pools(db::connect_in_memory().await.unwrap())
}

#[tokio::test]
async fn insert_assigns_increasing_ids() {
    let repo = repo().await;
    let a = repo.insert(NewUser::new("A", "a@example.com")).await.unwrap();
    let b = repo.insert(NewUser::new("B", "b@example.com")).await.unwrap();

    assert!(a.id > 0);
    assert!(b.id > a.id);
    assert_eq!(repo.count().await.unwrap(), 2);
    assert!(repo.exists_by_id(a.id).await.unwrap());
    assert!(repo.exists_by_email("b@example.com").await.unwrap());
    assert_eq!(
        repo.find_by_email("a@example.com").await.unwrap().map(|u| u.id),
        Some(a.id)
    );
}

#[tokio::test]
async fn unique_index_rejects_duplicate_insert() {
    let repo = repo().await;
    repo.insert(NewUser::new("A", "a@example.com")).await.unwrap();

    let err = repo
        .insert(NewUser::new("B", "a@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, SaveError::EmailTaken(ref e) if e == "a@example.com"));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn unique_index_rejects_conflicting_update() {
    let repo = repo().await;
    repo.insert(NewUser::new("A", "a@example.com")).await.unwrap();
    let mut b = repo.insert(NewUser::new("B", "b@example.com")).await.unwrap();

    b.email = "a@example.com".into();
    let err = repo.update(b).await.unwrap_err();
    assert!(matches!(err, SaveError::EmailTaken(_)));
}

#[tokio::test]
async fn dropped_transaction_rolls_back() {
    let repo = repo().await;

    {
        let tx = repo.begin().await.unwrap();
        tx.insert(NewUser::new("A", "a@example.com")).await.unwrap();
        assert_eq!(tx.count().await.unwrap(), 1);
    }

    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn committed_transaction_is_visible() -> anyhow::Result<()> {
    let repo = repo().await;

    let tx = repo.begin().await?;
    let a = tx.insert(NewUser::new("A", "a@example.com")).await?;
    tx.commit().await?;

    assert_eq!(repo.find_by_id(a.id).await?, Some(a));
    Ok(())
}

#[tokio::test]
async fn delete_by_id_and_delete_all_report_affected_rows() {
    let repo = repo().await;
    let a = repo.insert(NewUser::new("A", "a@example.com")).await.unwrap();
    repo.insert(NewUser::new("B", "b@example.com")).await.unwrap();
    repo.insert(NewUser::new("C", "c@example.com")).await.unwrap();

    assert!(repo.delete_by_id(a.id).await.unwrap());
    assert!(!repo.delete_by_id(a.id).await.unwrap());
    assert_eq!(repo.delete_all().await.unwrap(), 2);
    assert!(repo.find_all().await.unwrap().is_empty());
}
