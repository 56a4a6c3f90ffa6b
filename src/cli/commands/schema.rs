//! Schema command implementation
//!
//! Prints the entity catalogue with its display directives.

use super::shared::ProcessingStats;
use crate::app::schema::{EntityAnnotations, EntityKind};
use crate::cli::args::{OutputFormat, SchemaArgs};
use crate::{Error, Result};
use colored::*;

pub async fn run_schema(args: SchemaArgs) -> Result<ProcessingStats> {
    args.validate()?;
    let kinds = select_entities(args.section.as_deref())?;

    match args.output_format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = kinds
                .iter()
                .map(|kind| {
                    serde_json::json!({
                        "section": kind.section_name(),
                        "annotations": kind.annotations(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            for kind in &kinds {
                print_entity(kind.section_name(), &kind.annotations());
            }
        }
    }

    Ok(ProcessingStats::default())
}

fn select_entities(section: Option<&str>) -> Result<Vec<EntityKind>> {
    match section {
        None => Ok(EntityKind::ALL.to_vec()),
        Some(name) => EntityKind::from_section_name(name)
            .map(|kind| vec![kind])
            .ok_or_else(|| Error::configuration(format!("Unknown section '{}'", name))),
    }
}

fn print_entity(section: &str, annotations: &EntityAnnotations) {
    println!("{}", section.bold());
    if !annotations.order.is_empty() {
        println!("   order: {}", annotations.order.join(", "));
    }
    if !annotations.hide.is_empty() {
        println!("   hide:  {}", annotations.hide.join(", ").dimmed());
    }
    for (quantity, value) in annotations.template {
        println!("   template {} = {:?}", quantity, value);
    }
    if let Some(plot) = &annotations.plot {
        println!("   plot: {} vs {}", plot.y, plot.x);
    }
    if let Some(label) = annotations.label_quantity {
        println!("   label: {}", label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_entities() {
        assert_eq!(select_entities(None).unwrap().len(), EntityKind::ALL.len());
        assert_eq!(
            select_entities(Some("NREL_JVmeasurement")).unwrap(),
            vec![EntityKind::JvMeasurement]
        );
        assert!(select_entities(Some("NREL_Nothing")).is_err());
    }
}
