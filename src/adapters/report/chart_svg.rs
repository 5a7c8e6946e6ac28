//! SVG equity chart.

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 360.0;
const PADDING: f64 = 56.0;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Balance per resolved trade as a standalone SVG line chart.
pub fn render_equity_svg(symbol: &str, equity_curve: &[f64]) -> String {
    let title = format!("Equity Curve - {}", escape(symbol));

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let min_equity = equity_curve.iter().copied().fold(f64::INFINITY, f64::min);
    let max_equity = equity_curve
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let range = max_equity - min_equity;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if equity_curve.len() > 1 {
        plot_width / (equity_curve.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = equity_curve
        .iter()
        .enumerate()
        .map(|(i, &equity)| {
            let x = PADDING + i as f64 * scale_x;
            let y = if range > 0.0 {
                HEIGHT - PADDING - (equity - min_equity) * scale_y
            } else {
                HEIGHT / 2.0
            };
            format!("{:.1},{:.1}", x, y)
        })
        .collect();

    let series = if points.is_empty() {
        format!(
            r#"<text x="{:.0}" y="{:.0}" text-anchor="middle">No equity data available.</text>"#,
            WIDTH / 2.0,
            HEIGHT / 2.0
        )
    } else {
        format!(
            r##"<polyline fill="none" stroke="#1f77b4" stroke-width="1.5" points="{}"/>
  <text x="{:.0}" y="{:.0}" font-size="10" text-anchor="end">{:.2}</text>
  <text x="{:.0}" y="{:.0}" font-size="10" text-anchor="end">{:.2}</text>"##,
            points.join(" "),
            PADDING - 4.0,
            PADDING + 4.0,
            max_equity,
            PADDING - 4.0,
            HEIGHT - PADDING,
            min_equity
        )
    };

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
  <rect width="100%" height="100%" fill="white"/>
  <text x="{cx:.0}" y="{ty:.0}" font-size="14" text-anchor="middle">{title}</text>
  <line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{by:.0}" stroke="black"/>
  <line x1="{p:.0}" y1="{by:.0}" x2="{rx:.0}" y2="{by:.0}" stroke="black"/>
  <text x="{cx:.0}" y="{xl:.0}" font-size="12" text-anchor="middle">Trades</text>
  <text x="14" y="{cy:.0}" font-size="12" text-anchor="middle" transform="rotate(-90 14 {cy:.0})">Balance</text>
  {series}
</svg>
"##,
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        cy = HEIGHT / 2.0,
        ty = PADDING / 2.0,
        p = PADDING,
        by = HEIGHT - PADDING,
        rx = WIDTH - PADDING,
        xl = HEIGHT - PADDING / 3.0,
        title = title,
        series = series,
    )
}
