//! Built-in report layouts, one module per report type.

pub mod cc_od;
pub mod deposits;
pub mod gl_balance;
pub mod loans;
pub mod sdv_lockers;

#[cfg(test)]
mod tests {
    use crate::config::ParseOptions;
    use crate::diagnostics::{Level, MemorySink, NullSink};
    use crate::engine::ReportParser;
    use crate::ReportKind;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn fixture(kind: ReportKind) -> &'static str {
        match kind {
            ReportKind::Deposits => include_str!("../../fixtures/deposits_balance.txt"),
            ReportKind::Loans => include_str!("../../fixtures/loans_balance.txt"),
            ReportKind::CcOd => include_str!("../../fixtures/cc_od_balance.txt"),
            ReportKind::SdvLockers => include_str!("../../fixtures/sdv_lockers.txt"),
            ReportKind::GlBalanceSheet => include_str!("../../fixtures/gl_balance_sheet.txt"),
        }
    }

    fn parser(kind: ReportKind) -> Box<dyn ReportParser> {
        Box::new(kind.parser(ParseOptions::default(), Arc::new(NullSink)))
    }

    #[test]
    fn test_row_shape_for_every_report() {
        for kind in ReportKind::ALL {
            let result = parser(kind).parse(fixture(kind));
            assert!(!result.data.is_empty(), "{kind:?}");
            for row in &result.data {
                assert_eq!(row.len(), result.headers.len(), "{kind:?}");
            }
        }
    }

    #[test]
    fn test_empty_document() {
        for kind in ReportKind::ALL {
            let parser = parser(kind);
            let result = parser.parse("");
            assert_eq!(result.headers, parser.headers());
            assert!(result.data.is_empty());
            assert!(result.metadata.is_empty());
        }
    }

    #[test]
    fn test_garbage_line_yields_nothing() {
        let garbage = "1234567890 12/12/2020 11,000.00 OPEN Y N";
        assert_eq!(garbage.len(), 40);
        for kind in ReportKind::ALL {
            let sink = Arc::new(MemorySink::new());
            let parser = kind.parser(ParseOptions::default(), sink.clone());
            assert!(parser.parse(garbage).data.is_empty(), "{kind:?}");

            // wrapped in every kind of section marker it is still too short
            let wrapped = format!(
                "PRODUCT : X\nSEGMENT : X\nSCHEDULE - 01\nBEGIN LOCKER REGISTER\n{garbage}\nEND LOCKER REGISTER\n"
            );
            assert!(parser.parse(&wrapped).data.is_empty(), "{kind:?}");
            assert!(sink.events().iter().all(|d| d.level != Level::Warn || d.line.is_none()));
        }
    }

    #[test]
    fn test_two_sections_with_noise() {
        let good = |cust: u64, name: &str| {
            format!(
                "  {cust}  {acct} (HL-01)  {name:<32}15/03/2018  15/03/2038      2,500,000.00      1,845,320.50          0.00   8.75 STANDARD     N         12,450.75",
                acct = cust * 10_000 + 12
            )
        };
        let header = "  CUSTOMER NO   ACCOUNT NO     (PRODUCT) BORROWER NAME                SANCTION DT  MATURITY DT        LIMIT       OUTSTANDING       OVERDUE    ROI ASSET CLASS  RST     INT ACCRUED";
        let total = "  5012345699 PRODUCT TOTAL:                                                        6,700,000.00      5,549,420.50     25,400.00                              38,853.35";

        let mut lines = Vec::new();
        for (section, base) in [("HL-01", 5_012_345_600_u64), ("HL-02", 6_012_345_600_u64)] {
            lines.push(format!("PRODUCT : {section}"));
            lines.push(header.to_string());
            lines.push(good(base + 1, "FIRST BORROWER"));
            lines.push(header.to_string());
            lines.push(good(base + 2, "SECOND BORROWER"));
            lines.push(good(base + 3, "THIRD BORROWER"));
            lines.push(total.to_string());
        }
        let content = lines.join("\n");

        let result = parser(ReportKind::Loans).parse(&content);
        assert_eq!(result.data.len(), 6);
        let customers: Vec<&str> = result.column("Customer Number").unwrap().collect();
        assert_eq!(
            customers,
            vec!["5012345601", "5012345602", "5012345603", "6012345601", "6012345602", "6012345603"]
        );
        assert!(result.data.iter().all(|row| row[0] != "5012345699"));
    }

    #[test]
    fn test_parser_reuse_across_threads() {
        for kind in ReportKind::ALL {
            let parser = kind.parser(ParseOptions::default(), Arc::new(NullSink));
            let content = fixture(kind);
            let expected = parser.parse(content);

            let results: Vec<_> = std::thread::scope(|scope| {
                let handles: Vec<_> =
                    (0..4).map(|_| scope.spawn(|| parser.parse(content))).collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });
            for result in results {
                assert_eq!(result, expected);
            }
            assert_eq!(parser.parse(content), expected);
        }
    }
}
