//! `lumen-probe schemas` command - show the built-in field rules

use lumen_probe_core::schema::{PredictionType, Schema};

pub fn execute(prediction: Option<PredictionType>) {
    match prediction {
        Some(kind) => print_detail(&Schema::builtin(kind)),
        None => {
            for kind in PredictionType::ALL {
                let schema = Schema::builtin(kind);
                println!(
                    "{:<10} {} required field(s), {} array rule(s), {} score rule(s)",
                    schema.kind.to_string(),
                    schema.required.len(),
                    schema.arrays.len(),
                    schema.scores.len(),
                );
            }
        }
    }
}

fn print_detail(schema: &Schema) {
    println!("--- {} schema ---", schema.kind);
    println!("Required fields ({}):", schema.required.len());
    for field in &schema.required {
        println!("  {field}");
    }
    if !schema.arrays.is_empty() {
        println!("Array rules:");
        for rule in &schema.arrays {
            match rule.expected {
                Some(n) => println!("  {}: exactly {} item(s)", rule.field, n),
                None => println!("  {}: any length", rule.field),
            }
        }
    }
    if !schema.scores.is_empty() {
        println!("Score rules:");
        for rule in &schema.scores {
            println!("  {}: integer in [{}, {}]", rule.field, rule.min, rule.max);
        }
    }
}
