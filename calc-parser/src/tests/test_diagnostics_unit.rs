use crate::diagnostics::{CalcDiagnostic, DiagnosticContext, Diagnostics, Severity};
use crate::tokenizer::Span;
use crate::value::Kind;
use pretty_assertions::assert_eq;

fn on_line(line: usize, source: &str) -> Diagnostics {
    let context = DiagnosticContext {
        source_name: DiagnosticContext::STANDARD_INPUT.to_string(),
        line,
    };
    Diagnostics::new(context, source)
}

#[test]
fn test_severity_classification() {
    assert_eq!(
        CalcDiagnostic::UnclosedParen { count: 2 }.severity(),
        Severity::Warning
    );
    assert_eq!(
        CalcDiagnostic::IncompleteExpression.severity(),
        Severity::Warning
    );
    assert_eq!(CalcDiagnostic::EmptyGroup.severity(), Severity::Error);
    assert_eq!(
        CalcDiagnostic::UnboundName {
            name: "x".to_string()
        }
        .severity(),
        Severity::Error
    );
}

#[test]
fn test_messages() {
    assert_eq!(
        CalcDiagnostic::MissingOperand { operator: '+' }.to_string(),
        "Runtime error: Operator [+] expects two arguments"
    );
    assert_eq!(
        CalcDiagnostic::OperatorTypeMismatch {
            operator: '-',
            lhs: Kind::String,
            rhs: Kind::Number,
        }
        .to_string(),
        "Type mismatch: Operator [-] cannot operate on arguments of type [STRING] and [NUMBER]"
    );
    assert_eq!(
        CalcDiagnostic::EmptyGroup.to_string(),
        "Runtime error: Parentheses must not be empty"
    );
}

#[test]
fn test_collector_counts() {
    let mut diagnostics = on_line(3, "x + (1");
    assert!(!diagnostics.has_diagnostics());

    diagnostics.report(CalcDiagnostic::UnclosedParen { count: 1 });
    assert!(diagnostics.has_diagnostics());
    assert!(!diagnostics.has_errors());

    diagnostics.report(CalcDiagnostic::UnboundName {
        name: "x".to_string(),
    });
    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.error_count(), 1);
    assert_eq!(diagnostics.warning_count(), 1);
    assert!(diagnostics.contains(|d| matches!(d, CalcDiagnostic::UnboundName { .. })));
}

#[test]
fn test_plain_messages_carry_context() {
    let mut diagnostics = on_line(3, "x");
    diagnostics.report(CalcDiagnostic::UnboundName {
        name: "x".to_string(),
    });

    assert_eq!(
        diagnostics.plain_messages(),
        vec!["Standard Input [Line 3]: Runtime error: Name [x] not bound".to_string()]
    );
}

#[test]
fn test_next_line_advances() {
    let mut context = DiagnosticContext::new("script.calc");
    assert_eq!(context.next_line(), 1);
    assert_eq!(context.next_line(), 2);
    assert_eq!(context.to_string(), "script.calc [Line 2]");
    assert_eq!(
        DiagnosticContext::default().source_name,
        "Standard Input"
    );
}

#[test]
fn test_reports_one_per_diagnostic() {
    let mut diagnostics = on_line(1, "2 + 3)");
    diagnostics.report(CalcDiagnostic::unmatched_close_paren(Some(Span::new(5, 6))));
    diagnostics.report(CalcDiagnostic::IntegerDivisionByZero);

    let reports = diagnostics.create_reports();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].to_string(), "Unmatched closing parenthesis");
    assert_eq!(reports[1].to_string(), "Standard Input [Line 1]");
}
