//! List indicators command.

use anyhow::{bail, Result};
use techchart_registry::{Category, IndicatorRegistry, Placement};

use crate::cli::{IndicatorsArgs, OutputFormat};

pub fn run(args: IndicatorsArgs) -> Result<()> {
    let registry = IndicatorRegistry::global();

    let categories: Vec<Category> = match &args.category {
        Some(name) => match Category::ALL.iter().find(|c| c.to_string() == name.to_lowercase()) {
            Some(category) => vec![*category],
            None => bail!("Unknown category '{}' (trend, oscillator, volume, other)", name),
        },
        None => Category::ALL.to_vec(),
    };

    if args.output == OutputFormat::Json {
        let infos = registry
            .list()
            .iter()
            .filter(|d| categories.contains(&d.category))
            .map(|d| d.info())
            .collect::<Result<Vec<_>, _>>()?;
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("Available Indicators");
    println!("═══════════════════════════════════════════════════════════");

    for category in categories {
        println!();
        println!("  {}", category.to_string().to_uppercase());
        println!("  ───────────────────────────────────────────────────────");
        for definition in registry.by_category(category) {
            let params: Vec<String> = definition
                .params
                .iter()
                .map(|p| format!("{}={}", p.name, p.default))
                .collect();
            println!(
                "  {:<14} {:<40} {}",
                definition.key,
                definition.label,
                placement(&definition.placement)
            );
            if !params.is_empty() {
                println!("  {:<14} {}", "", params.join(", "));
            }
        }
    }

    println!();
    println!("Use --indicators <key,...> and --set key.param=value with the compute command.");

    Ok(())
}

fn placement(placement: &Placement) -> String {
    match placement {
        Placement::OnPrice => "price overlay".to_string(),
        Placement::OwnSubplot(name) => format!("subplot '{}'", name),
        Placement::SharedSubplot(key) => format!("shares '{}'", key),
    }
}
