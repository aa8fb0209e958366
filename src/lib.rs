//! Library to take point-in-time backups of an [Amazon QuickSight][qs] account.
//!
//! Every data source, dataset, analysis and dashboard of the account is
//! described through the QuickSight API and the description is written as a
//! JSON snapshot to S3. The procedure itself lives in [`backup`], the two
//! remote systems are reached through the seams in [`quicksight`] and
//! [`store`].
//!
//! [qs]: https://aws.amazon.com/quicksight/

#![forbid(unsafe_code)]

pub mod backup;
pub mod cli;
pub mod document;
pub mod quicksight;
pub mod store;
