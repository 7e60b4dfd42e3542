use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const FILES: [(&str, &str); 5] = [
    (
        "customers.csv",
        "customer_id,name,email,city,state,signup_date,loyalty_tier\n\
         C1,Ada Park,ada@example.com,Austin,TX,2023-01-05,gold\n\
         C2,Bo Chen,bo@example.com,Boston,MA,2023-02-10,silver\n",
    ),
    (
        "products.csv",
        "product_id,product_name,category,price,cost,currency,stock_status\n\
         P1,Mug,kitchen,12.50,4.00,USD,in_stock\n",
    ),
    (
        "orders.csv",
        "order_id,customer_id,order_date,order_status,payment_method,order_total,ship_city,ship_state\n\
         O1,C1,2024-01-10,delivered,card,25.00,Austin,TX\n\
         O2,C2,2024-02-01,shipped,paypal,12.50,Boston,MA\n",
    ),
    (
        "order_items.csv",
        "order_id,product_id,quantity,item_price,item_discount\n\
         O1,P1,2,12.50,0\n\
         O2,P1,1,12.50,0\n",
    ),
    (
        "reviews.csv",
        "review_id,order_id,customer_id,product_id,rating,review_text,review_date\n\
         R1,O1,C1,P1,5,Great mug,2024-01-20\n",
    ),
];

fn write_dataset(data_dir: &Path) {
    fs::create_dir_all(data_dir).unwrap();
    for (name, body) in FILES {
        fs::write(data_dir.join(name), body).unwrap();
    }
}

fn run_ingestor(root: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ecom_ingestor"))
        .current_dir(root)
        .env("APP__DATA_DIR", root.join("data"))
        .env("APP__DATABASE_PATH", root.join("ecom.db"))
        .env_remove("APP__METRICS_FILE")
        .env("RUST_LOG", "info")
        .output()
        .unwrap()
}

#[test]
fn prints_only_the_summary_on_stdout_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(&dir.path().join("data"));

    let out = run_ingestor(dir.path());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let stderr = String::from_utf8(out.stderr).unwrap();

    assert!(out.status.success(), "stderr: {stderr}");
    assert_eq!(
        stdout,
        "customers: inserted 2 rows\n\
         products: inserted 1 rows\n\
         orders: inserted 2 rows\n\
         order_items: inserted 2 rows\n\
         reviews: inserted 1 rows\n"
    );
    assert!(stderr.contains("Loaded table"), "stderr: {stderr}");
    assert!(dir.path().join("ecom.db").is_file());
}

#[test]
fn missing_file_exits_non_zero_with_message_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(&dir.path().join("data"));
    fs::remove_file(dir.path().join("data").join("reviews.csv")).unwrap();

    let out = run_ingestor(dir.path());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let stderr = String::from_utf8(out.stderr).unwrap();

    assert!(!out.status.success());
    assert!(stdout.is_empty(), "stdout: {stdout}");
    assert!(stderr.contains("Missing CSV file"), "stderr: {stderr}");
    assert!(stderr.contains("reviews.csv"), "stderr: {stderr}");
    assert!(!dir.path().join("ecom.db").exists());
}

#[test]
fn unparsable_number_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(&dir.path().join("data"));
    fs::write(
        dir.path().join("data").join("products.csv"),
        "product_id,product_name,category,price,cost,currency,stock_status\n\
         P1,Mug,kitchen,twelve,4.00,USD,in_stock\n",
    )
    .unwrap();

    let out = run_ingestor(dir.path());
    let stderr = String::from_utf8(out.stderr).unwrap();

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(stderr.contains("Malformed row"), "stderr: {stderr}");
}
