use std::net::SocketAddr;
use std::sync::Arc;

use transit_server::network::NetworkIndex;
use transit_server::planner::SearchConfig;
use transit_server::store::{TransitStore, sample_store};
use transit_server::web::{AppState, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transit_server=info".into()),
        )
        .init();

    // The demo deployment runs against the seeded in-memory store. A real
    // deployment swaps in a TransitStore over the production database.
    let store: Arc<dyn TransitStore> = Arc::new(sample_store());

    // Bootstrap is fail-loud: a snapshot that violates any network
    // invariant aborts startup rather than serving a partial network.
    let snapshot = store.load_snapshot().expect("load snapshot from store");
    let network = NetworkIndex::from_snapshot(snapshot).expect("snapshot violates invariants");
    println!(
        "Loaded {} stations, {} lines",
        network.station_count(),
        network.line_count()
    );

    let state = AppState::new(network, store, SearchConfig::default());
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    println!("Transit network server listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET    /health                        - Health check");
    println!("  GET    /api/stations?q=               - List/search stations");
    println!("  GET    /api/stations/:station/lines   - Lines serving a station");
    println!("  GET    /api/lines                     - List lines");
    println!("  GET    /api/lines/:line/stations      - Stops of a line, in order");
    println!("  GET    /api/routes?from=&to=          - Find routes");
    println!("  POST   /api/admin/stations            - Add a station");
    println!("  PUT    /api/admin/stations/:station   - Rename a station");
    println!("  DELETE /api/admin/stations/:station   - Delete a station");
    println!("  POST   /api/admin/lines               - Add a line");
    println!("  PUT    /api/admin/lines/:line         - Replace a line");
    println!("  DELETE /api/admin/lines/:line         - Delete a line");
    println!("  POST   /api/admin/lines/:line/stations - Add a station to a line");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
