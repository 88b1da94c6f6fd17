use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, trace};
use thiserror::Error;

use crate::ast::{AstNode, Bounds, Program};
use crate::grammar::Grammar;
use crate::interp::{EvalError, Evaluator, Interpreter};
use crate::synth::top_down::{Stats, TopDownEnum};
use crate::synth::Example;

/// The resource that ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Nodes(usize),
    Queue(usize),
    Steps(usize),
    Time(Duration),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthError {
    #[error("at least one example is required")]
    NoExamples,
    #[error("search budget exhausted: {0:?}")]
    BudgetExhausted(Budget),
    #[error("search cancelled")]
    Cancelled,
    #[error("worklist exhausted without a program")]
    Exhausted,
    #[error("evaluating a candidate failed: {0}")]
    Eval(#[from] EvalError),
}

/// Caps on a single run. Everything is unlimited by default.
#[derive(Debug, Clone, Default)]
pub struct Limits {
    /// Total nodes ever constructed.
    pub max_nodes: Option<usize>,
    pub max_queue: Option<usize>,
    /// Trees taken off the worklist.
    pub max_steps: Option<usize>,
    pub timeout: Option<Duration>,
    /// Checked once per step; raising it stops the search.
    pub cancel: Option<Arc<AtomicBool>>,
}

#[derive(Clone, Debug)]
pub enum SearchStep {
    Expanded {
        tree: Rc<AstNode>,
        kept: usize,
        pruned: usize,
    },
    IncorrectSample {
        cand: Program,
    },
    CorrectSample {
        answer: Program,
    },
}

/// Drives a [`TopDownEnum`] and checks the complete trees it produces
/// against the examples.
pub struct Search<E = Interpreter> {
    synth: TopDownEnum,
    examples: Vec<Example>,
    eval: E,
    limits: Limits,
    started: Instant,
    steps: usize,
}

impl Search<Interpreter> {
    pub fn new(grammar: Grammar, examples: Vec<Example>, limits: Limits) -> Result<Self, SynthError> {
        Self::with_evaluator(grammar, examples, limits, Interpreter)
    }
}

impl<E: Evaluator> Search<E> {
    pub fn with_evaluator(
        grammar: Grammar,
        examples: Vec<Example>,
        limits: Limits,
        eval: E,
    ) -> Result<Self, SynthError> {
        if examples.is_empty() {
            return Err(SynthError::NoExamples);
        }

        let bounds = Bounds::from_examples(&examples);
        info!("Searching with {} examples, bounds {bounds:?}", examples.len());

        Ok(Self {
            synth: TopDownEnum::new(grammar, bounds),
            examples,
            eval,
            limits,
            started: Instant::now(),
            steps: 0,
        })
    }

    pub fn bounds(&self) -> &Bounds {
        self.synth.bounds()
    }

    pub fn stats(&self) -> &Stats {
        self.synth.stats()
    }

    /// Performs one iteration: pop the cheapest tree, then either check it
    /// (complete) or expand its first hole (partial).
    pub fn step(&mut self) -> Result<SearchStep, SynthError> {
        let tree = self.synth.pop().ok_or(SynthError::Exhausted)?;
        if let Err(e) = self.check_limits() {
            // Keep the worklist intact so the search can be resumed.
            self.synth.unpop(tree);
            return Err(e);
        }
        self.steps += 1;

        let Some(cand) = Program::new(tree.clone()) else {
            let exp = self.synth.expand(&tree);
            trace!("Expand: {tree} -> {} kept, {} pruned", exp.kept, exp.pruned);

            return Ok(SearchStep::Expanded {
                tree,
                kept: exp.kept,
                pruned: exp.pruned,
            });
        };

        if self.consistent(&cand)? {
            debug!("Accepted: {cand} (cost {:.1}, {} nodes)", cand.root().cost(), cand.root().size());
            Ok(SearchStep::CorrectSample { answer: cand })
        } else {
            debug!("Rejected: {cand}");
            Ok(SearchStep::IncorrectSample { cand })
        }
    }

    /// Steps until a program matches every example or the search stops.
    pub fn run(&mut self) -> Result<Program, SynthError> {
        loop {
            if let SearchStep::CorrectSample { answer } = self.step()? {
                info!("Found {answer} after {} steps", self.steps);
                debug!("Stats: {:?}", self.stats());
                return Ok(answer);
            }
        }
    }

    fn consistent(&self, cand: &Program) -> Result<bool, EvalError> {
        for ex in &self.examples {
            if !ex.accepts(&self.eval, cand)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn check_limits(&self) -> Result<(), SynthError> {
        let limits = &self.limits;

        if limits.cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed)) {
            return Err(SynthError::Cancelled);
        }
        if let Some(max) = limits.max_steps.filter(|max| self.steps >= *max) {
            return Err(SynthError::BudgetExhausted(Budget::Steps(max)));
        }
        if let Some(max) = limits.max_nodes.filter(|max| self.stats().nodes_built > *max) {
            return Err(SynthError::BudgetExhausted(Budget::Nodes(max)));
        }
        if let Some(max) = limits.max_queue.filter(|max| self.synth.queue_len() > *max) {
            return Err(SynthError::BudgetExhausted(Budget::Queue(max)));
        }
        if let Some(max) = limits.timeout.filter(|max| self.started.elapsed() >= *max) {
            return Err(SynthError::BudgetExhausted(Budget::Time(max)));
        }

        Ok(())
    }
}

/// Finds the cheapest program of `grammar` consistent with `examples`.
pub fn synthesize(grammar: Grammar, examples: Vec<Example>, limits: Limits) -> Result<Program, SynthError> {
    Search::new(grammar, examples, limits)?.run()
}
