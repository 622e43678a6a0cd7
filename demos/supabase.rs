use ua_forge::store::SupabaseClient;
use ua_forge::{AppType, CatalogSnapshot, SynthConfig, Synthesizer};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = SynthConfig::from_env().expect("a valid generator config");
    let client = SupabaseClient::from_env().expect("SUPABASE_URL and SUPABASE_ANON_KEY");
    let snapshot = CatalogSnapshot::fetch(&client, AppType::Facebook, &config.locale_key)
        .await
        .expect("a catalog snapshot");
    println!("snapshot: {:#?}", snapshot.locales);

    let ua = Synthesizer::new(config)
        .expect("a synthesizer")
        .generate(&snapshot, &mut rand::thread_rng())
        .expect("a user agent");
    println!("{:#?}", ua);
}
