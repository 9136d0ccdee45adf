use anyhow::Context;
use reflex_vision::overlay::annotate_with_defaults;
use reflex_vision::{ReflexConfig, ReflexPipeline};
use std::env;

fn main() -> anyhow::Result<()> {
    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: visual_tuner <input_frame.png> [output_annotated.png]");
        return Ok(());
    }
    let input_path = &args[1];
    let output_path = args.get(2).map(String::as_str).unwrap_or("annotated.png");

    // --- 2. Frame Loading ---
    let mut frame = image::open(input_path)
        .with_context(|| format!("failed to open frame {input_path}"))?
        .to_rgba8();

    // --- 3. Detection ---
    let mut pipeline = ReflexPipeline::new(ReflexConfig::default());
    let report = pipeline.assess(&frame);

    match &report.boundary {
        Some(blob) => println!(
            "boundary marker: center=({}, {}) radius={}",
            blob.center_x, blob.center_y, blob.radius
        ),
        None => println!("boundary marker: not found"),
    }
    match &report.target {
        Some(blob) => println!(
            "target marker:   center=({}, {}) radius={}",
            blob.center_x, blob.center_y, blob.radius
        ),
        None => println!("target marker:   not found"),
    }
    match &report.proximity {
        Some(proximity) => println!(
            "gap = {:.2} ({})",
            proximity.gap,
            if proximity.is_close { "close" } else { "not close" }
        ),
        None => println!("gap: n/a (need both markers)"),
    }

    // --- 4. Annotated Output ---
    annotate_with_defaults(&mut frame, &report);
    frame
        .save(output_path)
        .with_context(|| format!("failed to save {output_path}"))?;
    println!("annotated frame written to {output_path}");

    Ok(())
}
