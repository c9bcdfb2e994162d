#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `steps` units of work framed by `TaskStart`/`TaskFinish`, emitting
    /// one `TaskIncrement` per completed step.
    pub fn task<T, E, F>(&self, steps: u64, mut step: F) -> Result<Vec<T>, E>
    where
        F: FnMut(u64) -> Result<T, E>,
    {
        self.report(Progress::TaskStart { total_steps: steps });
        let mut results = Vec::with_capacity(steps as usize);
        for i in 0..steps {
            results.push(step(i)?);
            self.report(Progress::TaskIncrement);
        }
        self.report(Progress::TaskFinish);
        Ok(results)
    }
}
