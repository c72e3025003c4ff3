use fitbit_client::{FitbitClient, config::Config, http_client::ReqwestFitbitClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects FITBIT_ACCESS_TOKEN in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = ReqwestFitbitClient::new(&cfg.base_url, cfg.access_token);
    let today = chrono::Utc::now().date_naive().to_string();
    let summary = client.get_daily_summary(&today).await?;
    println!(
        "{}: {} kcal burned / {} kcal consumed, {} steps, {} kg",
        summary.date,
        summary.calories_burned,
        summary.calories_consumed,
        summary.steps,
        summary.weight
    );
    Ok(())
}
