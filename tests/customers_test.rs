mod common;

use anyhow::Result;
use common::{parse_date, seeded_customer, test_service};
use fiado::application::{AppError, CustomerUpdate};
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_fetch_customer() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let created = service
        .create_customer(
            "Alice Silva".into(),
            Some("(11) 99999-9999".into()),
            Some(parse_date("2025-07-01")),
        )
        .await?;

    let detail = service.get_customer_detail(created.id).await?;
    assert_eq!(detail.customer.name, "Alice Silva");
    assert_eq!(detail.customer.phone, Some("(11) 99999-9999".to_string()));
    assert_eq!(
        detail.customer.next_payment_date,
        Some(parse_date("2025-07-01"))
    );
    assert_eq!(detail.balance, 0, "New customer starts with no balance");
    assert!(detail.transactions.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_create_customer_rejects_empty_name() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.create_customer("   ".into(), None, None).await;
    assert!(matches!(result, Err(AppError::InvalidCustomer(_))));

    Ok(())
}

#[tokio::test]
async fn test_unknown_customer_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.get_customer_detail(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::CustomerNotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_list_customers_sorted_by_debt() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // Alice ends at 100.00, Bob at 300.00, Carol at 0.
    seeded_customer(&service, "Alice Silva").await?;
    let bob = service
        .create_customer("Roberto Carlos".into(), None, None)
        .await?;
    service
        .record_transaction(bob.id, "300.00", "SALE", "Terno completo", None)
        .await?;
    service.create_customer("Carol".into(), None, None).await?;

    let entries = service.list_customers().await?;
    let names: Vec<&str> = entries.iter().map(|e| e.customer.name.as_str()).collect();
    assert_eq!(names, vec!["Roberto Carlos", "Alice Silva", "Carol"]);
    assert_eq!(entries[0].balance, 30000);
    assert_eq!(entries[1].balance, 10000);
    assert_eq!(entries[2].balance, 0);

    Ok(())
}

#[tokio::test]
async fn test_update_customer_fields() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let customer = service
        .create_customer("Alice".into(), None, Some(parse_date("2025-07-01")))
        .await?;

    let updated = service
        .update_customer(
            customer.id,
            CustomerUpdate {
                name: Some("Alice Silva".into()),
                phone: Some("(11) 98888-7777".into()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.name, "Alice Silva");
    assert_eq!(updated.phone, Some("(11) 98888-7777".to_string()));
    // Untouched field survives the update
    assert_eq!(updated.next_payment_date, Some(parse_date("2025-07-01")));

    let cleared = service
        .update_customer(
            customer.id,
            CustomerUpdate {
                clear_next_payment_date: true,
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(cleared.next_payment_date, None);

    Ok(())
}

#[tokio::test]
async fn test_update_rejects_blank_name() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let customer = service.create_customer("Alice".into(), None, None).await?;
    let result = service
        .update_customer(
            customer.id,
            CustomerUpdate {
                name: Some("  ".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidCustomer(_))));

    Ok(())
}

#[tokio::test]
async fn test_delete_customer_cascades_to_transactions() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let alice = seeded_customer(&service, "Alice Silva").await?;
    let bob = seeded_customer(&service, "Roberto Carlos").await?;
    assert_eq!(service.list_transactions().await?.len(), 4);

    service.delete_customer(alice.id).await?;

    // Alice is gone along with her history; Bob's is untouched.
    assert!(matches!(
        service.get_customer_detail(alice.id).await,
        Err(AppError::CustomerNotFound(_))
    ));
    let remaining = service.list_transactions().await?;
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|tx| tx.customer_id == bob.id));

    Ok(())
}

#[tokio::test]
async fn test_delete_unknown_customer_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.delete_customer(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::CustomerNotFound(_))));

    Ok(())
}
