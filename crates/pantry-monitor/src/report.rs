//! Report rendering over the computed analytics payload.
//!
//! This is the presentation boundary: weekday and month labels are
//! translated here (pt-BR abbreviations, matching the audience of the
//! original dashboard) and nowhere else — the core only knows ordinals.

use pantry_core::formatting::{format_currency, format_number, format_percent};
use pantry_core::models::Weekday;
use pantry_data::analysis::AnalysisResult;

/// pt-BR weekday abbreviation for display.
fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "Seg",
        Weekday::Tuesday => "Ter",
        Weekday::Wednesday => "Qua",
        Weekday::Thursday => "Qui",
        Weekday::Friday => "Sex",
        Weekday::Saturday => "Sáb",
        Weekday::Sunday => "Dom",
    }
}

/// pt-BR month abbreviation for display; `month` is 1-based.
fn month_label(month: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
    ];
    MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("???")
}

/// Render the full analysis as a plain-text report.
pub fn render_text(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let payload = &result.payload;

    out.push_str("── Resumo ────────────────────────────────\n");
    out.push_str(&format!(
        "Gasto total:        {}\n",
        format_currency(payload.kpis.total_spend)
    ));
    out.push_str(&format!(
        "Itens:              {}\n",
        format_number(payload.kpis.item_count as f64, 0)
    ));
    out.push_str(&format!(
        "Gasto médio/dia:    {}\n",
        format_currency(payload.kpis.avg_daily_spend)
    ));
    out.push_str(&format!(
        "Variação mensal:    {}\n",
        format_percent(payload.kpis.month_over_month_variance_pct)
    ));
    out.push_str(&format!(
        "Alojamentos ativos: {}\n",
        payload.kpis.distinct_site_count
    ));

    if !payload.by_category.is_empty() {
        out.push_str("\n── Gastos por categoria ──────────────────\n");
        for row in &payload.by_category {
            out.push_str(&format!(
                "{:<24} {}\n",
                row.category,
                format_currency(row.total_spend)
            ));
        }
    }

    if !payload.by_site.is_empty() {
        out.push_str("\n── Gastos por alojamento ─────────────────\n");
        for row in &payload.by_site {
            out.push_str(&format!(
                "{:<24} {}\n",
                row.site,
                format_currency(row.total_spend)
            ));
        }
    }

    if !payload.top_by_quantity.is_empty() {
        out.push_str("\n── Produtos mais comprados ───────────────\n");
        for (position, row) in payload.top_by_quantity.iter().enumerate() {
            out.push_str(&format!(
                "{:>2}. {:<20} qtde {:<10} {}\n",
                position + 1,
                row.item,
                format_number(row.total_quantity, 0),
                format_currency(row.total_spend)
            ));
        }
    }

    if !payload.top_by_unit_price.is_empty() {
        out.push_str("\n── Produtos mais caros (valor unitário) ──\n");
        for (position, row) in payload.top_by_unit_price.iter().enumerate() {
            out.push_str(&format!(
                "{:>2}. {:<20} {}\n",
                position + 1,
                row.item,
                format_currency(row.mean_unit_value)
            ));
        }
    }

    if !payload.site_statistics.is_empty() {
        out.push_str("\n── Estatísticas por alojamento ───────────\n");
        for row in &payload.site_statistics {
            out.push_str(&format!(
                "{:<16} total {:<14} médio {:<12} compras {:<5} qtde {}\n",
                row.site,
                format_currency(row.total_spend),
                format_currency(row.mean_spend),
                row.transaction_count,
                format_number(row.total_quantity, 0)
            ));
        }
    }

    if !payload.monthly.is_empty() {
        out.push_str("\n── Gastos por mês ────────────────────────\n");
        for row in &payload.monthly {
            out.push_str(&format!(
                "{:<10} {}\n",
                row.period.to_string(),
                format_currency(row.total_spend)
            ));
        }
    }

    if !payload.weekday_average.is_empty() {
        out.push_str("\n── Gasto médio por dia da semana ─────────\n");
        for row in &payload.weekday_average {
            out.push_str(&format!(
                "{:<4} {}\n",
                weekday_label(row.weekday),
                format_currency(row.mean_spend)
            ));
        }
    }

    if !payload.seasonality.is_empty() {
        out.push_str("\n── Sazonalidade (gasto médio por mês) ────\n");
        for row in &payload.seasonality {
            out.push_str(&format!(
                "{:<4} {}\n",
                month_label(row.month),
                format_currency(row.mean_spend)
            ));
        }
    }

    out.push_str(&format!(
        "\n{} registros ({} lidos, {} descartados)\n",
        result.metadata.rows_after_filter,
        result.metadata.rows_read,
        result.metadata.rows_dropped
    ));

    out
}

/// Render the payload and run metadata as a pretty-printed JSON document.
pub fn render_json(result: &AnalysisResult) -> anyhow::Result<String> {
    let doc = serde_json::json!({
        "payload": result.payload,
        "metadata": result.metadata,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
