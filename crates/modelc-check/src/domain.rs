//! Domain checks

use crate::context::CheckContext;
use modelc_core::DiagnosticCode;
use modelc_model::Domain;

/// Validates one domain
pub struct DomainChecker;

impl DomainChecker {
    pub fn check(ctx: &mut CheckContext<'_>, domain: &Domain) {
        let file = domain.file.as_str();

        if !ctx.rules.is_domain_code(&domain.code) {
            ctx.report(
                DiagnosticCode::DomainCodeCasing,
                file,
                format!("Domain code {} must match DO_[A-Z0-9_]+", domain.code),
            );
        }

        if domain.data_type.is_none() {
            ctx.report(
                DiagnosticCode::DomainMissingDataType,
                file,
                format!("Domain {} has no data type", domain.code),
            );
        }

        if domain.persistent_type.is_none() {
            let detail = if domain.length.is_some() || domain.precision.is_some() {
                " but declares a length or precision"
            } else {
                ""
            };
            ctx.report(
                DiagnosticCode::DomainMissingPersistentType,
                file,
                format!("Domain {} has no persistent type{}", domain.code, detail),
            );
        }

        if domain.precision.is_some() && domain.length.is_none() {
            ctx.report(
                DiagnosticCode::DomainPrecisionWithoutLength,
                file,
                format!("Domain {} declares a precision without a length", domain.code),
            );
        }
    }
}
