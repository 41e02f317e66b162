// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::finding::BrokenLinkFinding;
use crate::domain::models::job::JobStatus;
use crate::domain::repositories::finding_repository::FindingRepository;
use crate::domain::repositories::job_repository::RepositoryError;
use crate::infrastructure::database::entities::broken_link;
use crate::infrastructure::repositories::job_repo_impl::{guarded_status_update, transition_error};
use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

/// 断链记录仓库实现
#[derive(Clone)]
pub struct FindingRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl FindingRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<broken_link::Model> for BrokenLinkFinding {
    fn from(model: broken_link::Model) -> Self {
        Self {
            id: model.id,
            job_id: model.job_id,
            source_url: model.source_url,
            broken_url: model.broken_url,
            anchor_text: model.anchor_text.unwrap_or_default(),
            status_code: model.status_code,
            created_at: model.created_at,
        }
    }
}

impl From<&BrokenLinkFinding> for broken_link::ActiveModel {
    fn from(finding: &BrokenLinkFinding) -> Self {
        Self {
            id: Set(finding.id),
            job_id: Set(finding.job_id),
            source_url: Set(finding.source_url.clone()),
            broken_url: Set(finding.broken_url.clone()),
            anchor_text: Set(Some(finding.anchor_text.clone())),
            status_code: Set(finding.status_code),
            created_at: Set(finding.created_at),
        }
    }
}

fn finding_key_conflict() -> OnConflict {
    OnConflict::columns([
        broken_link::Column::JobId,
        broken_link::Column::BrokenUrl,
        broken_link::Column::SourceUrl,
    ])
    .do_nothing()
    .to_owned()
}

#[async_trait]
impl FindingRepository for FindingRepositoryImpl {
    async fn insert_finding(&self, finding: &BrokenLinkFinding) -> Result<bool, RepositoryError> {
        let model: broken_link::ActiveModel = finding.into();
        let inserted = broken_link::Entity::insert(model)
            .on_conflict(finding_key_conflict())
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(inserted > 0)
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<BrokenLinkFinding>, RepositoryError> {
        let models = broken_link::Entity::find()
            .filter(broken_link::Column::JobId.eq(job_id))
            .order_by_asc(broken_link::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_by_job(&self, job_id: Uuid) -> Result<u64, RepositoryError> {
        let count = broken_link::Entity::find()
            .filter(broken_link::Column::JobId.eq(job_id))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    async fn persist_and_complete(
        &self,
        job_id: Uuid,
        findings: &[BrokenLinkFinding],
    ) -> Result<u64, RepositoryError> {
        let txn = self.db.begin().await?;

        if !findings.is_empty() {
            let models: Vec<broken_link::ActiveModel> = findings.iter().map(Into::into).collect();
            broken_link::Entity::insert_many(models)
                .on_conflict(finding_key_conflict())
                .exec_without_returning(&txn)
                .await?;
        }

        let count = broken_link::Entity::find()
            .filter(broken_link::Column::JobId.eq(job_id))
            .count(&txn)
            .await?;

        let result_count = i32::try_from(count).unwrap_or(i32::MAX);
        let affected =
            guarded_status_update(&txn, job_id, JobStatus::Completed, Some(result_count), None)
                .await?;

        if affected == 0 {
            let err = transition_error(&txn, job_id, JobStatus::Completed).await;
            txn.rollback().await?;
            return Err(err);
        }

        txn.commit().await?;
        Ok(count)
    }
}
