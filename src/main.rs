use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lakhua::{GeocodeOptions, GeocodeResult, Geocoder, StoreCache, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "lakhua")]
#[command(about = "Offline reverse geocoding for India")]
struct Args {
    /// Directory containing reverse_geo_{4,5}.{json,bin}
    #[arg(long, global = true, default_value = lakhua::config::DATA_DIR_NAME)]
    data_dir: PathBuf,

    /// H3 resolution for coordinate lookups (clamped to 4..=5)
    #[arg(short, long, global = true, allow_negative_numbers = true)]
    resolution: Option<i64>,

    /// Only try the starting resolution
    #[arg(long, global = true)]
    no_fallback: bool,

    /// Log load and lookup timings
    #[arg(long, global = true)]
    debug: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a latitude/longitude pair
    #[command(allow_negative_numbers = true)]
    Coord { lat: f64, lon: f64 },
    /// Look up an H3 cell id
    Cell { cell: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = GeocodeOptions {
        resolution: args.resolution,
        fallback: !args.no_fallback,
        debug: args.debug,
    };

    let stores = Arc::new(StoreCache::new(StoreConfig::new(&args.data_dir)));
    let geocoder = Geocoder::new(stores);

    let result = match &args.command {
        Command::Coord { lat, lon } => geocoder.geocode(*lat, *lon, &options)?,
        Command::Cell { cell } => geocoder.geocode_cell(cell, &options)?,
    };

    match result {
        Some(place) if args.json => println!("{}", serde_json::to_string_pretty(&place)?),
        Some(place) => print_place(&place),
        None if args.json => println!("null"),
        None => println!("No match"),
    }

    Ok(())
}

fn print_place(place: &GeocodeResult) {
    println!("{}", place.city);
    println!("  State: {}", place.state);
    if let Some(district) = &place.district {
        println!("  District: {}", district);
    }
    if let Some(pincode) = &place.pincode {
        println!("  Pincode: {}", pincode);
    }
    println!(
        "  Matched: {} (r{})",
        place.matched_cell, place.matched_resolution
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coord_with_negative_longitude() {
        let args = Args::try_parse_from([
            "lakhua", "--data-dir", "/srv/lakhua", "-r", "4", "coord", "28.6139", "-77.2",
        ])
        .unwrap();
        assert_eq!(args.data_dir, PathBuf::from("/srv/lakhua"));
        assert_eq!(args.resolution, Some(4));
        assert!(matches!(args.command, Command::Coord { lat, lon } if lat == 28.6139 && lon == -77.2));
    }

    #[test]
    fn test_parse_cell_with_trailing_flags() {
        let args =
            Args::try_parse_from(["lakhua", "cell", "8560145bfffffff", "--no-fallback", "--json"])
                .unwrap();
        assert!(args.no_fallback);
        assert!(args.json);
        assert!(!args.debug);
        assert!(matches!(args.command, Command::Cell { ref cell } if cell == "8560145bfffffff"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["lakhua", "28.6", "77.2"]).is_err());
    }
}
