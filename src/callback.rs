//! Training-loop observer interface
//!
//! The training loop owns the network and the optimizer; observers only see
//! them through [`TrainContext`]. Every hook defaults to a no-op so an
//! observer implements just the events it cares about.

use crate::metrics::MetricLog;
use crate::Result;

/// A network being trained.
pub trait Network {
    /// Human-readable name of the network (e.g. its top-level module).
    fn name(&self) -> &str;
}

/// Read access to the training loop's state during a hook.
pub trait TrainContext {
    /// The network being trained.
    fn network(&self) -> &dyn Network;

    /// Current learning rate of every optimizer parameter group.
    fn learning_rates(&self) -> Vec<f64>;
}

/// Lifecycle hooks invoked by the training loop.
pub trait Callback {
    /// Called once before the first epoch.
    fn on_train_begin(&mut self, _ctx: &dyn TrainContext) -> Result<()> {
        Ok(())
    }

    /// Called at the start of each epoch (1-based).
    fn on_epoch_begin(&mut self, _epoch: usize, _ctx: &dyn TrainContext) -> Result<()> {
        Ok(())
    }

    /// Called after each training batch (1-based within the epoch).
    fn on_train_batch_end(
        &mut self,
        _batch: usize,
        _logs: &MetricLog,
        _ctx: &dyn TrainContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Called after each epoch, once validation metrics are in `logs`.
    fn on_epoch_end(
        &mut self,
        _epoch: usize,
        _logs: &MetricLog,
        _ctx: &dyn TrainContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Called once after the last epoch.
    fn on_train_end(&mut self, _ctx: &dyn TrainContext) -> Result<()> {
        Ok(())
    }
}

/// Ordered set of observers registered with a training loop.
///
/// Dispatch stops at the first failing observer and returns its error.
#[derive(Default)]
pub struct CallbackList {
    callbacks: Vec<Box<dyn Callback>>,
}

impl CallbackList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer; observers run in registration order.
    pub fn push(&mut self, callback: Box<dyn Callback>) {
        self.callbacks.push(callback);
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Check whether no observer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl Callback for CallbackList {
    fn on_train_begin(&mut self, ctx: &dyn TrainContext) -> Result<()> {
        for callback in &mut self.callbacks {
            callback.on_train_begin(ctx)?;
        }
        Ok(())
    }

    fn on_epoch_begin(&mut self, epoch: usize, ctx: &dyn TrainContext) -> Result<()> {
        for callback in &mut self.callbacks {
            callback.on_epoch_begin(epoch, ctx)?;
        }
        Ok(())
    }

    fn on_train_batch_end(
        &mut self,
        batch: usize,
        logs: &MetricLog,
        ctx: &dyn TrainContext,
    ) -> Result<()> {
        for callback in &mut self.callbacks {
            callback.on_train_batch_end(batch, logs, ctx)?;
        }
        Ok(())
    }

    fn on_epoch_end(&mut self, epoch: usize, logs: &MetricLog, ctx: &dyn TrainContext) -> Result<()> {
        for callback in &mut self.callbacks {
            callback.on_epoch_end(epoch, logs, ctx)?;
        }
        Ok(())
    }

    fn on_train_end(&mut self, ctx: &dyn TrainContext) -> Result<()> {
        for callback in &mut self.callbacks {
            callback.on_train_end(ctx)?;
        }
        Ok(())
    }
}

impl<C: Callback + 'static> From<Vec<C>> for CallbackList {
    fn from(callbacks: Vec<C>) -> Self {
        Self {
            callbacks: callbacks
                .into_iter()
                .map(|c| Box::new(c) as Box<dyn Callback>)
                .collect(),
        }
    }
}
