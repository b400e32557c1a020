use std::fmt::Write;
use stockrisk_core::analysis::Analysis;

const LABELS: [&str; 6] = [
    "VaR (95%)",
    "CVaR (95%)",
    "Volatility",
    "Sharpe Ratio",
    "Sortino Ratio",
    "Max Drawdown",
];

/// Plain-text summary: six labeled metrics followed by the decision.
pub fn summary(analysis: &Analysis) -> String {
    let f = &analysis.formatted;
    let values = [
        &f.var_95,
        &f.cvar_95,
        &f.volatility,
        &f.sharpe_ratio,
        &f.sortino_ratio,
        &f.max_drawdown,
    ];

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} daily closes, {} to {})",
        analysis.ticker, analysis.price_points, analysis.first_date, analysis.last_date
    );
    for (label, value) in LABELS.iter().zip(values) {
        let _ = writeln!(out, "  {label:<14} {value:>10}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Investment decision: {}", analysis.report.decision);
    let _ = writeln!(out, "  {}", f.decision);
    out
}
