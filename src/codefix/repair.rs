use crate::codefix::{is_likely_broken, sanitize};
use crate::config::MAX_REPAIR_ATTEMPTS;
use crate::error::Result;
use crate::models::PromptPart;
use crate::prompts::REPAIR_INSTRUCTION;
use async_trait::async_trait;

/// Seam over the model service so the repair path can be driven by stubs in
/// tests. The Bedrock vision client is the production implementation.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn generate(&self, model_id: &str, parts: Vec<PromptPart>) -> Result<String>;
}

/// Best-effort single-shot repair. Detects structural damage in `text`; if
/// found, asks the same model for a corrected complete file and sanitizes the
/// answer. A failed or empty repair call keeps the pre-repair text — repair
/// never makes the request worse and never raises.
///
/// `attempts` is clamped to [`MAX_REPAIR_ATTEMPTS`]; the default budget of
/// one means one detection, at most one model call, and no re-detection of
/// the repaired output.
pub async fn maybe_repair<C>(text: &str, client: &C, model_id: &str, attempts: u32) -> String
where
    C: ModelInvoker + ?Sized,
{
    let attempts = attempts.min(MAX_REPAIR_ATTEMPTS);
    let mut current = text.to_string();

    for attempt in 0..attempts {
        if !is_likely_broken(&current) {
            return current;
        }

        log::info!(
            "generated source looks structurally broken; requesting repair ({}/{})",
            attempt + 1,
            attempts
        );

        let prompt = format!("{}\n\n{}", REPAIR_INSTRUCTION, current);
        match client
            .generate(model_id, vec![PromptPart::Text(prompt)])
            .await
        {
            Ok(repaired) if !repaired.trim().is_empty() => {
                current = sanitize(&repaired);
            }
            Ok(_) => {
                log::warn!("repair call returned no usable text; keeping original output");
                return current;
            }
            Err(e) => {
                log::warn!("repair call failed ({}); keeping original output", e);
                return current;
            }
        }
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SketchGenError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BROKEN: &str = "const s = `hello";

    struct FixedInvoker {
        calls: AtomicUsize,
        reply: String,
    }

    impl FixedInvoker {
        fn new(reply: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: reply.to_string(),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelInvoker for FixedInvoker {
        async fn generate(&self, _model_id: &str, _parts: Vec<PromptPart>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingInvoker {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ModelInvoker for FailingInvoker {
        async fn generate(&self, _model_id: &str, _parts: Vec<PromptPart>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SketchGenError::AwsError("simulated outage".into()))
        }
    }

    #[tokio::test]
    async fn test_clean_input_skips_the_model() {
        let stub = FixedInvoker::new("unused");
        let result = maybe_repair("const a = 1;", &stub, "model-x", 1).await;
        assert_eq!(result, "const a = 1;");
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_repair_is_capped_at_one_call() {
        // Stub keeps returning broken text; the orchestrator must not loop.
        let stub = FixedInvoker::new("const s = `still broken");
        let result = maybe_repair(BROKEN, &stub, "model-x", 1).await;
        assert_eq!(stub.call_count(), 1);
        // Still-broken output is returned as-is, no re-detection round.
        assert_eq!(result, "const s = `still broken");
    }

    #[tokio::test]
    async fn test_failed_repair_returns_original() {
        let stub = FailingInvoker {
            calls: AtomicUsize::new(0),
        };
        let result = maybe_repair(BROKEN, &stub, "model-x", 1).await;
        assert_eq!(result, BROKEN);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_repair_returns_original() {
        let stub = FixedInvoker::new("   \n  ");
        let result = maybe_repair(BROKEN, &stub, "model-x", 1).await;
        assert_eq!(result, BROKEN);
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_successful_repair_is_sanitized() {
        let stub = FixedInvoker::new("const s = {}'\n<div>x</div>");
        let result = maybe_repair(BROKEN, &stub, "model-x", 1).await;
        assert_eq!(result, "const s = {}\n<div>x</div>");
    }

    #[tokio::test]
    async fn test_zero_budget_disables_repair() {
        let stub = FixedInvoker::new("unused");
        let result = maybe_repair(BROKEN, &stub, "model-x", 0).await;
        assert_eq!(result, BROKEN);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_budget_clamped_to_hard_cap() {
        let stub = FixedInvoker::new("const s = `still broken");
        maybe_repair(BROKEN, &stub, "model-x", 100).await;
        assert!(stub.call_count() <= MAX_REPAIR_ATTEMPTS as usize);
    }
}
