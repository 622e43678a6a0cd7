use serde_json::json;
use ua_forge::store::MemoryStore;
use ua_forge::{
    AppType, AppVersion, CatalogSnapshot, Configuration, DeviceModel, IosVersion, Synthesizer,
};

fn ios(version: &str, build: &str, usage: f64) -> IosVersion {
    IosVersion {
        version: version.into(),
        build_number: build.into(),
        webkit_version: "605.1.15".into(),
        usage_percentage: Some(usage),
        is_active: true,
    }
}

fn instagram(version: &str, build: &str, fbrv: Option<&str>, usage: f64) -> AppVersion {
    AppVersion {
        app_type: AppType::Instagram,
        version: version.into(),
        build_number: build.into(),
        fbrv: fbrv.map(String::from),
        usage_percentage: Some(usage),
        is_active: true,
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let mut pro = DeviceModel::new("iPhone16,1");
    pro.screen_scaling = vec!["3.00".into()];
    let store = MemoryStore::new(
        vec![DeviceModel::new("iPhone 12"), pro],
        vec![ios("17.2.1", "21C62", 60.0), ios("16.7.2", "20H115", 40.0)],
        vec![
            instagram("324.0", "563128347", Some("5723"), 70.0),
            instagram("312.1.0", "545987722", None, 30.0),
        ],
        vec![Configuration {
            config_key: "languages".into(),
            config_value: json!({"en_US": 80, "en_GB": 12, "es_US": 8}),
            description: None,
        }],
    );

    let snapshot = CatalogSnapshot::fetch(&store, AppType::Instagram, "languages")
        .await
        .expect("an in-memory snapshot");
    let count = std::env::args()
        .nth(1)
        .and_then(|n| n.parse().ok())
        .unwrap_or(5);

    for ua in Synthesizer::default()
        .generate_batch(&snapshot, count, None)
        .expect("user agents from the demo catalog")
    {
        println!("{}", ua.user_agent);
    }
}
