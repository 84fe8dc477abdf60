//! Shared learner handle for concurrent callers
//!
//! The ledger and statistics table are updated together, so one mutex guards
//! the whole learner for the duration of each operation.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::experience::Experience;
use super::meta_learner::{Insights, MetaLearner, Recommendation};

/// Cloneable handle to a single [`MetaLearner`]
#[derive(Clone)]
pub struct SharedMetaLearner {
    inner: Arc<Mutex<MetaLearner>>,
}

impl SharedMetaLearner {
    pub fn new(learner: MetaLearner) -> Self {
        Self {
            inner: Arc::new(Mutex::new(learner)),
        }
    }

    pub async fn learn_from_experience(&self, experience: Experience) {
        self.inner.lock().await.learn_from_experience(experience);
    }

    pub async fn recommend(&self, task_type: &str) -> Recommendation {
        self.inner.lock().await.recommend(task_type)
    }

    pub async fn insights(&self) -> Insights {
        self.inner.lock().await.insights()
    }

    /// Copy of the current learner state
    pub async fn snapshot(&self) -> MetaLearner {
        self.inner.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_records_are_all_counted() {
        let shared = SharedMetaLearner::new(MetaLearner::new(1000, 0.01));

        let mut handles = Vec::new();
        for worker in 0..8 {
            let learner = shared.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    let approach = if worker % 2 == 0 { "even" } else { "odd" };
                    let score = if worker % 2 == 0 { 1.0 } else { 0.0 };
                    learner.learn_from_experience(Experience::new("batch", approach, score)).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let insights = shared.insights().await;
        assert_eq!(insights.total_experiences, 200);
        assert_eq!(insights.meta_knowledge_size, 1);

        let snapshot = shared.snapshot().await;
        assert_eq!(snapshot.stats("batch", "even").unwrap().count, 100);
        assert_eq!(snapshot.stats("batch", "odd").unwrap().count, 100);
        assert_eq!(shared.recommend("batch").await.approach, "even");
    }
}
