use super::classifier::{classify_throw, ThrowKind};
use super::synthesizer::{synthesize_trigger_call, TriggerRegion};
use super::{ConstructorLatch, Error, RewriteTarget, RuleRegistry, TriggerSpec};
use crate::jvm::code::{CodeCursor, CodeElement, MethodCode};

/// Weaves a trigger call in front of the Nth explicit throw of one method
///
/// The rewriter itself holds no per-method state, so one value can rewrite the same method any
/// number of times, from any number of threads.
#[derive(Debug)]
pub struct ThrowTriggerRewriter {
    target: RewriteTarget,
    trigger: TriggerSpec,
}

/// Result of rewriting a method
#[derive(Debug)]
pub struct RewriteOutcome {
    /// Rewritten code (same as the input if nothing was woven in)
    pub code: MethodCode,

    /// Where the trigger call ended up, if anywhere
    pub trigger_region: Option<TriggerRegion>,

    /// Explicit throws counted (this stops increasing once the target count is reached)
    pub occurrences_seen: usize,

    /// Did a constructor finish without ever initializing its receiver?
    pub latch_left_closed: bool,
}

impl RewriteOutcome {
    pub fn is_modified(&self) -> bool {
        self.trigger_region.is_some()
    }
}

/// Mutable state for one pass over a method
struct RewriteState {
    occurrences_seen: usize,

    /// Only for constructors
    latch: Option<ConstructorLatch>,

    trigger_region: Option<TriggerRegion>,
}

impl RewriteState {
    fn new(target: &RewriteTarget) -> RewriteState {
        RewriteState {
            occurrences_seen: 0,
            latch: if target.is_constructor() {
                Some(ConstructorLatch::new())
            } else {
                None
            },
            trigger_region: None,
        }
    }

    fn latch_open(&self) -> bool {
        self.latch.map_or(true, |latch| latch.is_open())
    }
}

/// Where the trigger call goes relative to the element under the cursor
#[derive(Copy, Clone, Debug)]
enum Placement {
    Before,
    After,
}

impl ThrowTriggerRewriter {
    /// Prepare to rewrite `target`, checking that the trigger is usable
    pub fn new(target: RewriteTarget, trigger: TriggerSpec) -> Result<Self, Error> {
        if trigger.count < 1 {
            return Err(Error::InvalidOccurrenceCount {
                target: target.to_string(),
                rule_key: trigger.rule_key,
                count: trigger.count,
            });
        }
        if !target.access_flags.has_code() {
            return Err(Error::NoMethodBody {
                target: target.to_string(),
                rule_key: trigger.rule_key,
            });
        }
        Ok(ThrowTriggerRewriter { target, trigger })
    }

    pub fn target(&self) -> &RewriteTarget {
        &self.target
    }

    pub fn trigger(&self) -> &TriggerSpec {
        &self.trigger
    }

    /// Rewrite the body of the target method
    ///
    /// The input is left untouched. On error, nothing of the partial rewrite is returned.
    pub fn rewrite(
        &self,
        code: &MethodCode,
        registry: &dyn RuleRegistry,
    ) -> Result<RewriteOutcome, Error> {
        let mut state = RewriteState::new(&self.target);
        let mut cursor = CodeCursor::new(code);

        while let Some(element) = cursor.advance() {
            match element {
                CodeElement::Instruction(insn) => {
                    let opened = match state.latch.as_mut() {
                        Some(latch) => latch.observe(insn),
                        None => false,
                    };
                    if opened {
                        log::debug!("Receiver of {} initialized", self.target);
                        if state.trigger_region.is_none()
                            && state.occurrences_seen >= self.trigger.count
                        {
                            self.insert_trigger(
                                &mut cursor,
                                registry,
                                &mut state,
                                Placement::After,
                            )?;
                        }
                    }
                }
                element if element.is_throw() => {
                    if state.occurrences_seen >= self.trigger.count {
                        continue;
                    }
                    match classify_throw(cursor.preceding()) {
                        ThrowKind::ReRaise => {
                            log::debug!("Skipping monitor re-raise in {}", self.target);
                        }
                        ThrowKind::Explicit => {
                            state.occurrences_seen += 1;
                            log::trace!(
                                "Explicit throw {}/{} in {}",
                                state.occurrences_seen,
                                self.trigger.count,
                                self.target
                            );
                            if state.occurrences_seen == self.trigger.count && state.latch_open() {
                                self.insert_trigger(
                                    &mut cursor,
                                    registry,
                                    &mut state,
                                    Placement::Before,
                                )?;
                            }
                        }
                    }
                }
                _ => (),
            }
        }

        let latch_left_closed = !state.latch_open();
        if latch_left_closed {
            log::warn!(
                "Constructor {} never initializes its receiver, rule '{}' not woven in",
                self.target,
                self.trigger.rule_name
            );
        }

        Ok(RewriteOutcome {
            code: cursor.finish(),
            trigger_region: state.trigger_region,
            occurrences_seen: state.occurrences_seen,
            latch_left_closed,
        })
    }

    fn insert_trigger(
        &self,
        cursor: &mut CodeCursor,
        registry: &dyn RuleRegistry,
        state: &mut RewriteState,
        placement: Placement,
    ) -> Result<(), Error> {
        let (call, region) = synthesize_trigger_call(&self.target, &self.trigger, registry, cursor)
            .map_err(|cause| Error::Registration {
                target: self.target.to_string(),
                rule_key: self.trigger.rule_key.clone(),
                cause,
            })?;

        log::info!("Inserting trigger for {}", self.trigger.rule_name);
        match placement {
            Placement::Before => cursor.insert_before(call),
            Placement::After => cursor.insert_after(call),
        }
        state.trigger_region = Some(region);
        Ok(())
    }
}
