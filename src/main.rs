use anyhow::{Context, Result};

use gapboard::config::Config;
use gapboard::error::NetworkError;
use gapboard::figure::build_decomposition_figure;
use gapboard::filter::FilterSelection;
use gapboard::logging::{json_log, obj, v_num, v_str, Domain};
use gapboard::series::Figure;
use gapboard::source::{DatasetSource, HttpSource, GAP_DATASET, NOISE_DATASET};
use gapboard::sweep::build_sweep_figure;

/// Fetch the decomposition dataset and assemble its figure. The default page
/// state selects every categorical value; the front-end re-invokes with a
/// narrower selection when its controls change.
async fn render_decomposition_view(source: &dyn DatasetSource) -> Result<Figure> {
    let table = source.fetch(GAP_DATASET).await?;
    let selection = FilterSelection::select_all(&table)?;
    let filtered = selection.apply(&table)?;
    json_log(
        Domain::Figure,
        "view_input",
        obj(&[
            ("view", v_str("decomposition")),
            ("rows", v_num(filtered.len() as f64)),
        ]),
    );
    build_decomposition_figure(&filtered)
}

async fn render_sweep_view(source: &dyn DatasetSource) -> Result<Figure> {
    let table = source.fetch(NOISE_DATASET).await?;
    json_log(
        Domain::Figure,
        "view_input",
        obj(&[
            ("view", v_str("noise_sweep")),
            ("rows", v_num(table.len() as f64)),
        ]),
    );
    build_sweep_figure(&table)
}

fn write_figure(out_dir: &str, name: &str, figure: &Figure) -> Result<()> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir))?;
    let path = format!("{}/{}.json", out_dir, name);
    std::fs::write(&path, figure.to_json()?).with_context(|| format!("writing {}", path))?;
    json_log(
        Domain::System,
        "figure_written",
        obj(&[
            ("path", v_str(&path)),
            ("series", v_num(figure.series.len() as f64)),
        ]),
    );
    Ok(())
}

/// A failed fetch halts the view with a banner and no partial chart; the other
/// view still renders.
fn handle_view(view: &str, result: Result<Figure>, out_dir: &str) -> Result<()> {
    match result {
        Ok(figure) => write_figure(out_dir, view, &figure),
        Err(err) => match err.downcast_ref::<NetworkError>() {
            Some(net) => {
                json_log(
                    Domain::System,
                    "view_failed",
                    obj(&[("view", v_str(view)), ("reason", v_str(&net.reason))]),
                );
                eprintln!("{}", net.user_message());
                Ok(())
            }
            None => Err(err),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    cfg.validate()?;
    json_log(
        Domain::System,
        "startup",
        obj(&[
            ("gap_url", v_str(&cfg.gap_url)),
            ("noise_url", v_str(&cfg.noise_url)),
            ("out_dir", v_str(&cfg.out_dir)),
        ]),
    );

    let source = HttpSource::new(&cfg);

    let decomposition = render_decomposition_view(&source).await;
    handle_view("decomposition", decomposition, &cfg.out_dir)?;

    let sweep = render_sweep_view(&source).await;
    handle_view("noise_sweep", sweep, &cfg.out_dir)?;

    Ok(())
}
