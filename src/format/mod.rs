//! Output formatting for search reports (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::model::{ComparisonGroup, RankedOffer, SearchReport};

/// Formats search reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a full comparison report.
    pub fn format_report(&self, report: &SearchReport) -> String {
        match self.format {
            OutputFormat::Json => self.json_report(report),
            OutputFormat::Table => self.table_report(report),
            OutputFormat::Markdown => self.markdown_report(report),
            OutputFormat::Csv => self.csv_offers(&report.offers),
        }
    }

    fn store_summary(report: &SearchReport) -> String {
        report
            .stores
            .iter()
            .map(|(store, status)| {
                if status.ok {
                    format!("{} ok", store)
                } else {
                    format!(
                        "{} failed ({})",
                        store,
                        status.error.as_deref().unwrap_or("unknown error")
                    )
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn price_cell(offer: &RankedOffer) -> String {
        match offer.offer.current_price {
            Some(price) => format!("{:.2}", price),
            None => "N/A".to_string(),
        }
    }

    fn truncate(text: &str, width: usize) -> String {
        if text.chars().count() <= width {
            return text.to_string();
        }

        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }

    fn group_label(group: &ComparisonGroup) -> String {
        match &group.product_size {
            Some(size) => format!("{} {} ({})", group.product_name, size, group.product_brand),
            None => format!("{} ({})", group.product_name, group.product_brand),
        }
    }

    // JSON formatting

    fn json_report(&self, report: &SearchReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    // Table formatting

    fn table_report(&self, report: &SearchReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Query:     {}", report.query));
        lines.push(format!("Category:  {}", report.category));
        lines.push(format!("Stores:    {}", Self::store_summary(report)));
        lines.push(format!(
            "Offers:    {} ranked from {} raw",
            report.offers_count, report.raw_offers_count
        ));

        if report.comparisons.is_empty() && report.offers.is_empty() {
            lines.push(String::new());
            lines.push("No matching offers found.".to_string());
            return lines.join("\n");
        }

        if !report.comparisons.is_empty() {
            lines.push(String::new());
            lines.push(self.table_comparisons(&report.comparisons));
        }

        if !report.offers.is_empty() {
            lines.push(String::new());
            lines.push(self.table_offers(&report.offers));
        }

        lines.push(String::new());
        lines.push(format!(
            "Total: {} groups, {} offers shown",
            report.count,
            report.offers.len()
        ));

        lines.join("\n")
    }

    fn table_comparisons(&self, groups: &[ComparisonGroup]) -> String {
        let name_width = 42;
        let store_width = 10;
        let price_width = 8;
        let savings_width = 8;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<name_width$}  {:<store_width$}  {:>price_width$}  {:>savings_width$}  {}",
            "Product", "Best at", "Price", "Savings", "Offers"
        ));
        lines.push(format!(
            "{:-<name_width$}  {:-<store_width$}  {:-<price_width$}  {:-<savings_width$}  {:-<6}",
            "", "", "", "", ""
        ));

        for group in groups {
            let label = Self::truncate(&Self::group_label(group), name_width);

            let (best_store, best_price) = match &group.best_offer {
                Some(best) => (best.offer.store.to_string(), Self::price_cell(best)),
                None => ("N/A".to_string(), "N/A".to_string()),
            };

            let savings = match group.savings {
                Some(amount) => format!("{:.2}", amount),
                None => "N/A".to_string(),
            };

            lines.push(format!(
                "{:<name_width$}  {:<store_width$}  {:>price_width$}  {:>savings_width$}  {:>6}",
                label,
                best_store,
                best_price,
                savings,
                group.offers.len()
            ));
        }

        lines.join("\n")
    }

    fn table_offers(&self, offers: &[RankedOffer]) -> String {
        let store_width = 10;
        let price_width = 8;
        let name_width = 42;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<store_width$}  {:>price_width$}  {:<name_width$}  {}",
            "Store", "Price", "Product", "Size"
        ));
        lines.push(format!(
            "{:-<store_width$}  {:-<price_width$}  {:-<name_width$}  {:-<8}",
            "", "", "", ""
        ));

        for ranked in offers {
            let name = Self::truncate(&ranked.offer.product_name, name_width);
            let size = ranked.offer.product_size.as_deref().unwrap_or("-");

            lines.push(format!(
                "{:<store_width$}  {:>price_width$}  {:<name_width$}  {}",
                ranked.offer.store.to_string(),
                Self::price_cell(ranked),
                name,
                size
            ));
        }

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_report(&self, report: &SearchReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## Price comparison: {}", report.query));
        lines.push(String::new());
        lines.push(format!("- **Category:** {}", report.category));
        lines.push(format!("- **Stores:** {}", Self::store_summary(report)));
        lines.push(format!(
            "- **Offers:** {} ranked from {} raw",
            report.offers_count, report.raw_offers_count
        ));

        if report.comparisons.is_empty() && report.offers.is_empty() {
            lines.push(String::new());
            lines.push("No matching offers found.".to_string());
            return lines.join("\n");
        }

        if !report.comparisons.is_empty() {
            lines.push(String::new());
            lines.push("| Product | Best at | Price | Savings | Offers |".to_string());
            lines.push("|---------|---------|-------|---------|--------|".to_string());

            for group in &report.comparisons {
                let label = Self::truncate(&Self::group_label(group), 40);

                let (best_store, best_price) = match &group.best_offer {
                    Some(best) => (best.offer.store.to_string(), Self::price_cell(best)),
                    None => ("N/A".to_string(), "N/A".to_string()),
                };

                let savings = match group.savings {
                    Some(amount) => format!("{:.2}", amount),
                    None => "N/A".to_string(),
                };

                lines.push(format!(
                    "| {} | {} | {} | {} | {} |",
                    label,
                    best_store,
                    best_price,
                    savings,
                    group.offers.len()
                ));
            }
        }

        if !report.offers.is_empty() {
            lines.push(String::new());
            lines.push("| Store | Price | Product | Size |".to_string());
            lines.push("|-------|-------|---------|------|".to_string());

            for ranked in &report.offers {
                let name = Self::truncate(&ranked.offer.product_name, 40);
                let size = ranked.offer.product_size.as_deref().unwrap_or("-");

                lines.push(format!(
                    "| {} | {} | {} | {} |",
                    ranked.offer.store,
                    Self::price_cell(ranked),
                    name,
                    size
                ));
            }
        }

        lines.push(String::new());
        lines.push(format!("*{} comparison groups found*", report.count));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "store,product_name,product_brand,product_size,price,currency,category,score,url"
            .to_string()
    }

    fn csv_offers(&self, offers: &[RankedOffer]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for ranked in offers {
            let offer = &ranked.offer;
            let price = offer.current_price.map(|p| p.to_string()).unwrap_or_default();
            let name = Self::csv_escape(&offer.product_name);
            let brand = Self::csv_escape(&offer.product_brand);
            let size =
                offer.product_size.as_ref().map(|s| Self::csv_escape(s)).unwrap_or_default();
            let currency = offer.currency.clone().unwrap_or_default();
            let url = offer.url.clone().unwrap_or_default();

            lines.push(format!(
                "{},{},{},{},{},{},{},{},{}",
                offer.store,
                name,
                brand,
                size,
                price,
                currency,
                offer.category,
                ranked.relevance_score,
                url
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
