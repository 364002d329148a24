mod helpers;

use dialcast_core::AppError;
use dialcast_services::ingest::MISSING_COLUMN_MESSAGE;
use helpers::setup_ingest;

#[tokio::test]
async fn test_missing_column_leaves_subscribers_untouched() {
    let Some(ctx) = setup_ingest().await else {
        return;
    };
    ctx.service
        .ingest(ctx.user.id, b"phone_number\n15550001\n15550002\n", false)
        .await
        .unwrap();

    let err = ctx
        .service
        .ingest(ctx.user.id, b"name,number\nAnn,15559999\n", true)
        .await
        .unwrap_err();
    match err {
        AppError::InvalidFormat(message) => assert_eq!(message, MISSING_COLUMN_MESSAGE),
        other => panic!("expected InvalidFormat, got {:?}", other),
    }

    assert_eq!(ctx.numbers().await, vec!["+15550001", "+15550002"]);
}

#[tokio::test]
async fn test_clear_upload_replaces_list_in_file_order() {
    let Some(ctx) = setup_ingest().await else {
        return;
    };
    ctx.service
        .ingest(ctx.user.id, b"phone_number\n15550001\n", false)
        .await
        .unwrap();

    let report = ctx
        .service
        .ingest(
            ctx.user.id,
            b"id,phone_number\n1,15550300\n2,\n3,0044207\n4,+15550100\n",
            true,
        )
        .await
        .unwrap();
    assert_eq!(report.cleared, 1);
    assert_eq!(report.inserted, 3);

    assert_eq!(ctx.numbers().await, vec!["+15550300", "0044207", "+15550100"]);
}
