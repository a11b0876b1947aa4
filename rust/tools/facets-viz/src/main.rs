use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use facets_table::{Table, Value, read};

mod bundle;
mod serve;

use bundle::{ATLAS_IMAGE_FILENAME, DiveSettings, INDEX_HTML};
use serve::{ArtifactGuard, StaticRoute};

#[derive(Parser, Debug)]
#[command(name = "facets-viz")]
#[command(about = "Serve a browsable Facets-style visualization of a csv file")]
#[command(version)]
struct Cli {
    /// Path to the csv file
    #[arg(long)]
    csv: String,

    /// Port for the local server
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Website title
    #[arg(long, default_value = "Facets csv visualizer")]
    title: String,

    /// Announcement printed next to the 'Dive' and 'Overview' tabs
    #[arg(long, default_value = "")]
    announcement: String,

    /// Row filter predicate, e.g. "species == 'cat' and weight > 4"
    #[arg(long, default_value = "")]
    filter: String,

    /// Column to group by in the Overview statistics
    #[arg(long, default_value = "")]
    overview_groupby: String,

    /// Row-based faceting
    #[arg(long, default_value = "")]
    row_facet: String,

    /// Column-based faceting
    #[arg(long, default_value = "")]
    column_facet: String,

    /// Vertical position in scatter mode
    #[arg(long, default_value = "")]
    vertical_position: String,

    /// Horizontal position in scatter mode
    #[arg(long, default_value = "")]
    horizontal_position: String,

    /// Field used to color datapoints
    #[arg(long, default_value = "")]
    color_by: String,

    /// Datapoint name
    #[arg(long, default_value = "")]
    field_name: String,

    /// Column with paths to PNG images to pack as sprites; all images must
    /// have the same width and height
    #[arg(long, default_value = "")]
    image_column: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    log_config(&cli);

    let table = read::load_csv(&cli.csv)?;
    let table = table.filter(&cli.filter)?;

    for field in [
        &cli.overview_groupby,
        &cli.row_facet,
        &cli.column_facet,
        &cli.vertical_position,
        &cli.horizontal_position,
        &cli.color_by,
        &cli.field_name,
        &cli.image_column,
    ] {
        if !field.is_empty() {
            table.verify_column(field)?;
        }
    }

    let mut table = table;
    let atlas = if cli.image_column.is_empty() {
        None
    } else {
        let paths = image_paths(&table, &cli.image_column)?;
        let atlas = facets_atlas::build_atlas(&paths)?;
        // Images travel only through the atlas, never as row payload.
        table.drop_column(&cli.image_column);
        Some(atlas)
    };

    log_summary(&table);

    let statistics = facets_data_stats::build_statistics(&table, &cli.overview_groupby)?;
    let jsonstr = bundle::records_json(&table)?;
    let protostr = bundle::statistics_base64(&statistics);

    let settings = DiveSettings {
        vertical_facet: cli.row_facet.clone(),
        horizontal_facet: cli.column_facet.clone(),
        color_by: cli.color_by.clone(),
        image_field_name: cli.field_name.clone(),
        vertical_position: cli.vertical_position.clone(),
        horizontal_position: cli.horizontal_position.clone(),
        atlas: atlas
            .as_ref()
            .map(|a| (a.sprite_width(), a.sprite_height())),
    };
    let html = bundle::render_page(
        &cli.title,
        &cli.announcement,
        &jsonstr,
        &protostr,
        &settings.to_json(),
    );

    // Artifacts are registered with the guard as soon as they hit disk, so
    // every exit path of the serving phase removes them.
    let mut guard = ArtifactGuard::new();
    std::fs::write(INDEX_HTML, &html)
        .with_context(|| format!("failed to write {INDEX_HTML}"))?;
    guard.push(INDEX_HTML);

    let mut routes = vec![
        StaticRoute {
            url_path: "/",
            file: PathBuf::from(INDEX_HTML),
            content_type: "text/html; charset=utf-8",
        },
        StaticRoute {
            url_path: "/index.html",
            file: PathBuf::from(INDEX_HTML),
            content_type: "text/html; charset=utf-8",
        },
    ];
    if let Some(atlas) = &atlas {
        atlas.write_png(ATLAS_IMAGE_FILENAME)?;
        guard.push(ATLAS_IMAGE_FILENAME);
        routes.push(StaticRoute {
            url_path: "/atlas.png",
            file: PathBuf::from(ATLAS_IMAGE_FILENAME),
            content_type: "image/png",
        });
    }

    serve::serve(cli.port, routes)
}

/// Collects the sprite paths from the image column, in row order.
fn image_paths(table: &Table, image_column: &str) -> Result<Vec<String>> {
    let column = table
        .column(image_column)
        .ok_or_else(|| facets_common::error::Error::unknown_column(image_column))?;
    column
        .values
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            Value::Text(path) => Ok(path.clone()),
            Value::Missing => Err(facets_common::error::Error::invalid_arg(
                "image_column",
                format!("row {row} has no image path"),
            )
            .into()),
            other => Ok(other.display_key()),
        })
        .collect()
}

fn log_config(cli: &Cli) {
    let mut entries = vec![
        ("announcement", cli.announcement.clone()),
        ("color_by", cli.color_by.clone()),
        ("column_facet", cli.column_facet.clone()),
        ("csv", cli.csv.clone()),
        ("field_name", cli.field_name.clone()),
        ("filter", cli.filter.clone()),
        ("horizontal_position", cli.horizontal_position.clone()),
        ("image_column", cli.image_column.clone()),
        ("overview_groupby", cli.overview_groupby.clone()),
        ("port", cli.port.to_string()),
        ("row_facet", cli.row_facet.clone()),
        ("title", cli.title.clone()),
        ("vertical_position", cli.vertical_position.clone()),
    ];
    entries.sort_by_key(|(key, _)| *key);
    log::info!("Params:");
    for (key, value) in entries {
        log::info!("  {key}: {value}");
    }
}

fn log_summary(table: &Table) {
    log::info!(
        "Loaded {} rows, {} columns:",
        table.row_count(),
        table.column_count()
    );
    for column in table.columns() {
        let missing = column.values.iter().filter(|v| v.is_missing()).count();
        log::info!(
            "  {}: kind={} missing={}",
            column.name,
            column.kind.as_str(),
            missing
        );
    }
}
