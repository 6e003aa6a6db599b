//! Per-operation switch for skipping document validation on writes.
//!
//! The switch is a `bool` decoration on the [`OperationContext`]. Write paths
//! read it through [`is_document_validation_disabled`]; handlers turn it on for
//! a region of code with [`DisableDocumentValidation`], usually after asking
//! [`should_bypass_document_validation`] whether the command requested it.

use std::ops::{Deref, DerefMut};

use vellum_core::{option_true_value, Document};

use crate::service::decoration::Decoration;
use crate::service::operation::OperationContext;

/// Decoration slot: if true, collections skip validation of writes made under
/// this operation context. Slots default to `false`.
pub struct DocumentValidationDisabled;

impl Decoration for DocumentValidationDisabled {
    type Value = bool;
}

/// Name of the command option requesting a validation bypass.
pub const BYPASS_DOCUMENT_VALIDATION_OPTION: &str = "bypassDocumentValidation";

/// Returns whether document validation is currently disabled for `ctx`.
#[must_use]
pub fn is_document_validation_disabled(ctx: &OperationContext) -> bool {
    ctx.decorations()
        .get::<DocumentValidationDisabled>()
        .copied()
        .unwrap_or_default()
}

/// Overwrites the validation switch for `ctx`.
pub fn set_document_validation_disabled(ctx: &mut OperationContext, disabled: bool) {
    *ctx.decorations_mut().get_mut::<DocumentValidationDisabled>() = disabled;
}

/// Whether a command's options ask for document validation to be bypassed.
///
/// A missing option means no bypass. A present one is coerced with the same
/// truthiness rule as every other boolean command option.
#[must_use]
pub fn should_bypass_document_validation(options: &Document) -> bool {
    option_true_value(options, BYPASS_DOCUMENT_VALIDATION_OPTION)
}

/// Disables document validation on a single operation context while in scope.
///
/// Restores the value seen at construction when dropped, including during
/// unwinding, so guards nest. The guard holds the context's only mutable
/// borrow and derefs to it; code inside the scope (and nested guards) reach
/// the context through the guard, which makes out-of-order drops a compile
/// error.
///
/// Restoration is unconditional: a value written to the switch while the
/// guard is alive is overwritten on drop.
#[derive(Debug)]
#[must_use = "validation is re-enabled as soon as the guard is dropped"]
pub struct DisableDocumentValidation<'a> {
    ctx: &'a mut OperationContext,
    initial_state: bool,
}

impl<'a> DisableDocumentValidation<'a> {
    pub fn new(ctx: &'a mut OperationContext) -> Self {
        let initial_state = is_document_validation_disabled(ctx);
        set_document_validation_disabled(ctx, true);
        Self { ctx, initial_state }
    }

    /// The switch value that will be restored when this guard drops.
    #[must_use]
    pub fn initial_state(&self) -> bool {
        self.initial_state
    }
}

impl Deref for DisableDocumentValidation<'_> {
    type Target = OperationContext;

    fn deref(&self) -> &OperationContext {
        self.ctx
    }
}

impl DerefMut for DisableDocumentValidation<'_> {
    fn deref_mut(&mut self) -> &mut OperationContext {
        self.ctx
    }
}

impl Drop for DisableDocumentValidation<'_> {
    fn drop(&mut self) {
        set_document_validation_disabled(self.ctx, self.initial_state);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use proptest::prelude::*;
    use serde_json::json;
    use vellum_core::Value;

    use super::*;
    use crate::service::operation::service_names;

    fn make_ctx() -> OperationContext {
        OperationContext::new(1, service_names::WRITE)
    }

    fn options(json: serde_json::Value) -> Document {
        Value::from(json).into_document().unwrap()
    }

    #[test]
    fn fresh_context_has_validation_enabled() {
        let ctx = make_ctx();
        assert!(!is_document_validation_disabled(&ctx));
        // Reading does not allocate the slot.
        assert!(ctx.decorations().is_empty());
    }

    #[test]
    fn set_then_get() {
        let mut ctx = make_ctx();
        set_document_validation_disabled(&mut ctx, true);
        assert!(is_document_validation_disabled(&ctx));
        set_document_validation_disabled(&mut ctx, false);
        assert!(!is_document_validation_disabled(&ctx));
    }

    #[test]
    fn flag_is_per_context() {
        let mut a = make_ctx();
        let b = make_ctx();
        set_document_validation_disabled(&mut a, true);
        assert!(is_document_validation_disabled(&a));
        assert!(!is_document_validation_disabled(&b));
    }

    #[test]
    fn guard_disables_then_restores_false() {
        let mut ctx = make_ctx();
        {
            let guard = DisableDocumentValidation::new(&mut ctx);
            assert!(is_document_validation_disabled(&guard));
            assert!(!guard.initial_state());
        }
        assert!(!is_document_validation_disabled(&ctx));
    }

    #[test]
    fn guard_restores_true_when_already_disabled() {
        let mut ctx = make_ctx();
        set_document_validation_disabled(&mut ctx, true);
        drop(DisableDocumentValidation::new(&mut ctx));
        assert!(is_document_validation_disabled(&ctx));
    }

    #[test]
    fn nested_guards_restore_in_reverse_order() {
        let mut ctx = make_ctx();
        {
            let mut outer = DisableDocumentValidation::new(&mut ctx);
            assert!(is_document_validation_disabled(&outer));
            assert!(!outer.initial_state());
            {
                let inner = DisableDocumentValidation::new(&mut outer);
                assert!(is_document_validation_disabled(&inner));
                assert!(inner.initial_state());
            }
            assert!(is_document_validation_disabled(&outer));
        }
        assert!(!is_document_validation_disabled(&ctx));
    }

    #[test]
    fn restore_wins_over_writes_made_inside_scope() {
        let mut ctx = make_ctx();
        {
            let mut guard = DisableDocumentValidation::new(&mut ctx);
            set_document_validation_disabled(&mut guard, false);
            assert!(!is_document_validation_disabled(&guard));
        }
        assert!(!is_document_validation_disabled(&ctx));

        set_document_validation_disabled(&mut ctx, true);
        {
            let mut guard = DisableDocumentValidation::new(&mut ctx);
            set_document_validation_disabled(&mut guard, false);
        }
        assert!(is_document_validation_disabled(&ctx));
    }

    #[test]
    fn moved_guard_restores_once() {
        fn hand_off(guard: DisableDocumentValidation<'_>) -> DisableDocumentValidation<'_> {
            guard
        }

        let mut ctx = make_ctx();
        {
            let guard = hand_off(DisableDocumentValidation::new(&mut ctx));
            assert!(is_document_validation_disabled(&guard));
        }
        assert!(!is_document_validation_disabled(&ctx));
    }

    #[test]
    fn error_return_restores_flag() {
        fn guarded_write(ctx: &mut OperationContext) -> anyhow::Result<()> {
            let guard = DisableDocumentValidation::new(ctx);
            assert!(is_document_validation_disabled(&guard));
            anyhow::bail!("write failed");
        }

        let mut ctx = make_ctx();
        assert!(guarded_write(&mut ctx).is_err());
        assert!(!is_document_validation_disabled(&ctx));
    }

    #[test]
    fn panic_unwind_restores_flag() {
        let mut ctx = make_ctx();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let guard = DisableDocumentValidation::new(&mut ctx);
            assert!(is_document_validation_disabled(&guard));
            panic!("write aborted");
        }));
        assert!(result.is_err());
        assert!(!is_document_validation_disabled(&ctx));
    }

    #[test]
    fn option_name_is_stable() {
        assert_eq!(BYPASS_DOCUMENT_VALIDATION_OPTION, "bypassDocumentValidation");
    }

    #[test]
    fn should_bypass_follows_truthiness() {
        assert!(!should_bypass_document_validation(&options(json!({}))));
        assert!(should_bypass_document_validation(&options(
            json!({ "bypassDocumentValidation": true })
        )));
        assert!(!should_bypass_document_validation(&options(
            json!({ "bypassDocumentValidation": false })
        )));
        assert!(!should_bypass_document_validation(&options(
            json!({ "bypassDocumentValidation": 0 })
        )));
        assert!(!should_bypass_document_validation(&options(
            json!({ "bypassDocumentValidation": 0.0 })
        )));
        assert!(!should_bypass_document_validation(&options(
            json!({ "bypassDocumentValidation": null })
        )));
        assert!(should_bypass_document_validation(&options(
            json!({ "bypassDocumentValidation": 1 })
        )));
        assert!(should_bypass_document_validation(&options(
            json!({ "bypassDocumentValidation": "x" })
        )));
    }

    #[test]
    fn should_bypass_ignores_other_options() {
        let opts = options(json!({ "ordered": true, "BypassDocumentValidation": true }));
        assert!(!should_bypass_document_validation(&opts));
    }

    /// Enters `depth` nested guards, checking the flag at every level on the
    /// way in and on the way out.
    fn nest(ctx: &mut OperationContext, depth: usize) {
        if depth == 0 {
            return;
        }
        let before = is_document_validation_disabled(ctx);
        {
            let mut guard = DisableDocumentValidation::new(ctx);
            assert_eq!(guard.initial_state(), before);
            assert!(is_document_validation_disabled(&guard));
            nest(&mut guard, depth - 1);
            assert!(is_document_validation_disabled(&guard));
        }
        assert_eq!(is_document_validation_disabled(ctx), before);
    }

    proptest! {
        #[test]
        fn any_nesting_depth_restores_prior_value(initial in any::<bool>(), depth in 0usize..32) {
            let mut ctx = make_ctx();
            set_document_validation_disabled(&mut ctx, initial);
            nest(&mut ctx, depth);
            prop_assert_eq!(is_document_validation_disabled(&ctx), initial);
        }
    }
}
