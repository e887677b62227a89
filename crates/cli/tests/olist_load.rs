//! End-to-end runs of the built-in descriptors against their real namespace
//! scripts, using trimmed-down Olist files.

use std::path::Path;

use sqlx::PgPool;
use stageload_cli::datasets::{
    ecommerce, marketing, ECOMMERCE_DIR, ECOMMERCE_SCHEMA, MARKETING_DIR, MARKETING_SCHEMA,
};
use stageload_db::schema::apply_schema;
use stageload_db::{load_dataset, ConnectionScope};
use tempfile::TempDir;

const CUSTOMERS: &str = "\
customer_id,customer_unique_id,customer_zip_code_prefix,customer_city,customer_state
c1,u1,14409,franca,SP
c2,u2,09790,sao bernardo do campo,SP
";

const GEOLOCATION: &str = "\
geolocation_zip_code_prefix,geolocation_lat,geolocation_lng,geolocation_city,geolocation_state
01037,-23.54562128115268,-46.63929204800168,sao paulo,SP
01037,-23.54562128115268,-46.63929204800168,sao paulo,SP
";

const SELLERS: &str = "\
seller_id,seller_zip_code_prefix,seller_city,seller_state
s1,13023,campinas,SP
s2,13844,mogi guacu,SP
";

const ORDERS: &str = "\
order_id,customer_id,order_status,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date
o1,c1,delivered,2017-10-02 10:56:33,2017-10-02 11:07:15,2017-10-04 19:55:00,2017-10-10 21:25:13,2017-10-18 00:00:00
o2,c2,shipped,2018-07-24 20:41:37,2018-07-26 03:24:27,2018-07-26 14:31:00,,2018-08-13 00:00:00
";

// r1 appears twice with different orders; the first row wins.
const REVIEWS: &str = "\
review_id,order_id,review_score,review_comment_title,review_comment_message,review_creation_date,review_answer_timestamp
r1,o1,4,,,2018-01-18 00:00:00,2018-01-18 21:46:59
r1,o2,1,,\"Não recebi, ainda\",2018-03-10 00:00:00,2018-03-11 03:05:13
r2,o2,5,,,2018-02-17 00:00:00,2018-02-18 14:36:24
";

const MQLS: &str = "\
mql_id,first_contact_date,landing_page_id,origin
m1,2018-02-01,lp1,social
m2,2017-10-20,lp2,paid_search
m3,2018-03-22,lp3,organic_search
";

// m2 names a seller missing from the e-commerce export; m3 has none.
const CLOSED_DEALS: &str = "\
mql_id,seller_id,sdr_id,sr_id,won_date,business_segment,lead_type,lead_behaviour_profile,has_company,has_gtin,average_stock,business_type,declared_product_catalog_size,declared_monthly_revenue
m1,s1,sdr1,sr1,2018-02-26 19:58:54,pet,online_medium,cat,,,,reseller,,0
m2,s9,sdr1,sr2,2018-05-08 20:17:59,car_accessories,industry,eagle,true,true,,reseller,,0
m3,,sdr2,sr2,2018-06-05 17:27:23,home_decor,online_big,wolf,false,,5-20,manufacturer,100,50000
";

fn write(root: &Path, dir: &str, name: &str, contents: &str) {
    let dir = root.join(dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), contents).unwrap();
}

fn olist_files() -> TempDir {
    let root = tempfile::tempdir().unwrap();
    let r = root.path();
    write(r, ECOMMERCE_DIR, "olist_customers_dataset.csv", CUSTOMERS);
    write(r, ECOMMERCE_DIR, "olist_geolocation_dataset.csv", GEOLOCATION);
    write(r, ECOMMERCE_DIR, "olist_sellers_dataset.csv", SELLERS);
    write(r, ECOMMERCE_DIR, "olist_orders_dataset.csv", ORDERS);
    write(r, ECOMMERCE_DIR, "olist_order_reviews_dataset.csv", REVIEWS);
    write(r, MARKETING_DIR, "olist_marketing_qualified_leads_dataset.csv", MQLS);
    write(r, MARKETING_DIR, "olist_closed_deals_dataset.csv", CLOSED_DEALS);
    root
}

async fn scope(pool: &PgPool) -> ConnectionScope {
    ConnectionScope::connect_with(&pool.connect_options())
        .await
        .unwrap()
}

#[sqlx::test]
async fn both_datasets_load_in_order(pool: PgPool) {
    let root = olist_files();
    let mut scope = scope(&pool).await;

    let ecommerce = ecommerce().unwrap();
    apply_schema(&mut scope, ecommerce.namespace(), ECOMMERCE_SCHEMA)
        .await
        .unwrap();
    let report = load_dataset(&mut scope, &ecommerce, root.path())
        .await
        .unwrap();

    // products, translations, order items and payments have no file here.
    assert_eq!(report.skipped_count(), 4);
    assert_eq!(report.outcome_for("ecommerce.geolocation").unwrap().rows_promoted, 2);
    let reviews = report.outcome_for("ecommerce.order_reviews").unwrap();
    assert_eq!(reviews.rows_landed, 3);
    assert_eq!(reviews.rows_promoted, 2);
    assert_eq!(reviews.rows_rejected, 1);

    let marketing = marketing().unwrap();
    apply_schema(&mut scope, marketing.namespace(), MARKETING_SCHEMA)
        .await
        .unwrap();
    let report = load_dataset(&mut scope, &marketing, root.path())
        .await
        .unwrap();
    scope.close().await.unwrap();

    let deals = report.outcome_for("marketing.closed_deals").unwrap();
    assert_eq!(deals.rows_landed, 3);
    assert_eq!(deals.rows_promoted, 2);
    assert_eq!(deals.rows_rejected, 1);

    let kept: Vec<String> =
        sqlx::query_scalar("SELECT mql_id FROM marketing.closed_deals ORDER BY mql_id")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(kept, ["m1", "m3"]);

    let first: String =
        sqlx::query_scalar("SELECT order_id FROM ecommerce.order_reviews WHERE review_id = 'r1'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(first, "o1");

    let ids: Vec<i64> =
        sqlx::query_scalar("SELECT geolocation_id FROM ecommerce.geolocation ORDER BY 1")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(ids, vec![1, 2]);
}

#[sqlx::test]
async fn marketing_without_ecommerce_fails_at_schema(pool: PgPool) {
    let mut scope = scope(&pool).await;
    let marketing = marketing().unwrap();

    let err = apply_schema(&mut scope, marketing.namespace(), MARKETING_SCHEMA)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        stageload_db::LoadError::Schema { ref namespace, .. } if namespace == "marketing"
    ));
}
