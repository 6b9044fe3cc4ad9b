//! `vitrine check` — diagnose configuration and knowledge base health.

use vitrine_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    println!("Vitrine assistant gateway — check");
    println!();
    println!("Backend:   {} ({})", config.backend, config.model);
    println!(
        "API key:   {}",
        if config.has_api_key() {
            "configured"
        } else {
            "MISSING — set api_key in vitrine.toml or export VITRINE_API_KEY"
        }
    );
    println!(
        "Gateway:   {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("Sessions:  cap {} turns", config.session.cap);

    match vitrine_knowledge::load_all(&config.knowledge.dir) {
        Ok(pack) => {
            println!(
                "Knowledge: {} document(s) in {}",
                pack.len(),
                config.knowledge.dir.display()
            );
            for doc in pack.documents() {
                println!("  - {}", doc.source_id);
            }
            if pack.is_empty() {
                println!("  (empty — answers will have nothing to cite)");
            }
        }
        Err(e) => {
            println!("Knowledge: FAILED — {e}");
            println!("  The gateway will not start without a readable knowledge directory.");
        }
    }

    Ok(())
}
