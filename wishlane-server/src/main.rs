use std::env;

use log::info;
use wishlane_social::{PgDatabase, Social};

#[tokio::main]
async fn main() {
    wishlane_server::init_logger();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL is set");

    let database = PgDatabase::new(&database_url)
        .await
        .expect("connects to database");

    database.migrate().await.expect("migrations run");

    info!("Connected to database");

    let social = Social::new(database);

    wishlane_server::run_server(social).await;
}
