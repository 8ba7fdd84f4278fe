use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::{
	Error, ResearchService, Result,
	model::{GuardrailStatus, ResearchRequest, ResearchResult},
	progress::{ProgressSink, RunEvent},
	state::RunState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	MemoryCheck,
	Plan,
	Search,
	Summarize,
	Write,
	Review,
}
impl Stage {
	/// Step tag carried by progress events.
	pub fn step(self) -> &'static str {
		match self {
			Self::MemoryCheck => "memory_check",
			Self::Plan => "planner",
			Self::Search => "search",
			Self::Summarize => "ingest",
			Self::Write => "writer",
			Self::Review => "review",
		}
	}

	fn entry_message(self) -> &'static str {
		match self {
			Self::MemoryCheck => "Checking vector memory for prior research.",
			Self::Plan => "Planning search queries.",
			Self::Search => "Searching the web.",
			Self::Summarize => "Summarizing results and storing them in memory.",
			Self::Write => "Writing the research brief.",
			Self::Review => "Reviewing the draft.",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
	Done,
	MemoryHit,
	MemoryMiss,
	Reviewed(GuardrailStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
	Approved,
	Rejected,
	RetriesExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
	Advance(Stage),
	/// Write again with the same context.
	Revise,
	Finish(Termination),
}

/// Next step of a run given the stage that just finished and what it reported.
pub fn transition(
	stage: Stage,
	outcome: StageOutcome,
	retry_count: u32,
	max_revisions: u32,
) -> Result<Transition> {
	let next = match (stage, outcome) {
		(Stage::MemoryCheck, StageOutcome::MemoryHit) => Transition::Advance(Stage::Write),
		(Stage::MemoryCheck, StageOutcome::MemoryMiss) => Transition::Advance(Stage::Plan),
		(Stage::Plan, StageOutcome::Done) => Transition::Advance(Stage::Search),
		(Stage::Search, StageOutcome::Done) => Transition::Advance(Stage::Summarize),
		(Stage::Summarize, StageOutcome::Done) => Transition::Advance(Stage::Write),
		(Stage::Write, StageOutcome::Done) => Transition::Advance(Stage::Review),
		(Stage::Review, StageOutcome::Reviewed(GuardrailStatus::Approved)) =>
			Transition::Finish(Termination::Approved),
		(Stage::Review, StageOutcome::Reviewed(GuardrailStatus::Rejected)) =>
			Transition::Finish(Termination::Rejected),
		(Stage::Review, StageOutcome::Reviewed(GuardrailStatus::NeedsRevision)) =>
			if retry_count < max_revisions {
				Transition::Revise
			} else {
				Transition::Finish(Termination::RetriesExhausted)
			},
		(stage, outcome) => {
			return Err(Error::InvalidState {
				message: format!("Stage {stage:?} cannot report {outcome:?}."),
			});
		},
	};

	Ok(next)
}

/// Returns the trimmed topic, or an invalid-request error when nothing is left.
pub fn validate_request(req: &ResearchRequest) -> Result<String> {
	let topic = req.topic.trim();

	if topic.is_empty() {
		return Err(Error::InvalidRequest { message: "topic must not be empty.".to_string() });
	}

	Ok(topic.to_string())
}

impl ResearchService {
	/// Drives one research run to completion, reporting progress to `progress`.
	///
	/// The run stops with [`Error::Cancelled`] at the next stage boundary once the progress
	/// receiver is dropped.
	pub async fn run(&self, req: ResearchRequest, progress: &ProgressSink) -> Result<ResearchResult> {
		let topic = validate_request(&req)?;
		let max_revisions = self.cfg.research.max_revisions;
		let mut state = RunState::new(topic, req.depth);
		let mut stage = Stage::MemoryCheck;

		tracing::info!(topic = %state.topic, depth = ?state.depth, "Research run started.");

		let termination = loop {
			if progress.is_cancelled() {
				tracing::info!(
					topic = %state.topic,
					stage = stage.step(),
					"Progress receiver closed. Stopping run."
				);

				return Err(Error::Cancelled);
			}

			progress.emit(stage.step(), stage.entry_message());

			let outcome = self.run_stage(stage, &mut state, progress).await?;

			match transition(stage, outcome, state.retry_count, max_revisions)? {
				Transition::Advance(next) => stage = next,
				Transition::Revise => {
					state.retry_count += 1;

					progress.emit(
						"revise",
						format!(
							"Review requested changes. Revision {} of {max_revisions}.",
							state.retry_count
						),
					);

					stage = Stage::Write;
				},
				Transition::Finish(termination) => break termination,
			}
		};

		if termination == Termination::RetriesExhausted {
			tracing::warn!(
				topic = %state.topic,
				retries = state.retry_count,
				"Revision budget exhausted. Returning the last draft."
			);

			state.mark_retries_exhausted();
		}

		tracing::info!(
			topic = %state.topic,
			?termination,
			reused_from_memory = state.reused_from_memory,
			"Research run finished."
		);

		state.into_result()
	}

	/// Validates `req`, then runs it on its own task. The receiver yields progress events
	/// followed by exactly one terminal event; dropping it cancels the run.
	pub fn spawn_run(self: Arc<Self>, req: ResearchRequest) -> Result<UnboundedReceiver<RunEvent>> {
		validate_request(&req)?;

		let (tx, rx) = mpsc::unbounded_channel();
		let sink = ProgressSink::new(tx);

		tokio::spawn(async move {
			match self.run(req, &sink).await {
				Ok(result) => sink.send(RunEvent::Completed(result)),
				Err(Error::Cancelled) => tracing::info!("Research run cancelled."),
				Err(err) => {
					tracing::error!(error = %err, "Research run failed.");

					sink.send(RunEvent::Failed {
						error_code: err.code().to_string(),
						message: err.to_string(),
					});
				},
			}
		});

		Ok(rx)
	}

	async fn run_stage(
		&self,
		stage: Stage,
		state: &mut RunState,
		progress: &ProgressSink,
	) -> Result<StageOutcome> {
		match stage {
			Stage::MemoryCheck =>
				if self.check_memory(state).await? {
					progress.emit(
						"memory_hit",
						format!("Reusing {} stored findings.", state.memory_context.len()),
					);

					Ok(StageOutcome::MemoryHit)
				} else {
					progress.emit("memory_miss", "No prior research found. Starting fresh research.");

					Ok(StageOutcome::MemoryMiss)
				},
			Stage::Plan => self.plan(state).await.map(|()| StageOutcome::Done),
			Stage::Search => self.search(state).await.map(|()| StageOutcome::Done),
			Stage::Summarize => self.summarize(state).await.map(|()| StageOutcome::Done),
			Stage::Write => self.write(state).await.map(|()| StageOutcome::Done),
			Stage::Review => self.review(state).await.map(StageOutcome::Reviewed),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::Depth;

	#[test]
	fn memory_hit_skips_fresh_research() {
		let next = transition(Stage::MemoryCheck, StageOutcome::MemoryHit, 0, 3).unwrap();

		assert_eq!(next, Transition::Advance(Stage::Write));
	}

	#[test]
	fn memory_miss_runs_the_full_pipeline() {
		let mut stage = Stage::MemoryCheck;
		let mut visited = vec![stage];
		let mut outcome = StageOutcome::MemoryMiss;

		while let Transition::Advance(next) = transition(stage, outcome, 0, 3).unwrap() {
			stage = next;
			outcome = StageOutcome::Done;

			visited.push(stage);
		}

		assert_eq!(visited, vec![
			Stage::MemoryCheck,
			Stage::Plan,
			Stage::Search,
			Stage::Summarize,
			Stage::Write,
			Stage::Review,
		]);
	}

	#[test]
	fn review_verdicts_route_the_loop() {
		let reviewed = |status| StageOutcome::Reviewed(status);

		assert_eq!(
			transition(Stage::Review, reviewed(GuardrailStatus::Approved), 0, 3).unwrap(),
			Transition::Finish(Termination::Approved)
		);
		assert_eq!(
			transition(Stage::Review, reviewed(GuardrailStatus::Rejected), 0, 3).unwrap(),
			Transition::Finish(Termination::Rejected)
		);
		assert_eq!(
			transition(Stage::Review, reviewed(GuardrailStatus::NeedsRevision), 2, 3).unwrap(),
			Transition::Revise
		);
		assert_eq!(
			transition(Stage::Review, reviewed(GuardrailStatus::NeedsRevision), 3, 3).unwrap(),
			Transition::Finish(Termination::RetriesExhausted)
		);
	}

	#[test]
	fn zero_revision_budget_finishes_after_first_review() {
		let next =
			transition(Stage::Review, StageOutcome::Reviewed(GuardrailStatus::NeedsRevision), 0, 0)
				.unwrap();

		assert_eq!(next, Transition::Finish(Termination::RetriesExhausted));
	}

	#[test]
	fn mismatched_outcome_is_an_internal_error() {
		let err = transition(Stage::Plan, StageOutcome::MemoryHit, 0, 3).unwrap_err();

		assert_eq!(err.code(), "INTERNAL_ERROR");
	}

	#[test]
	fn blank_topic_is_rejected() {
		let err = validate_request(&ResearchRequest::new(" \t\n", Depth::Quick)).unwrap_err();

		assert_eq!(err.code(), "INVALID_REQUEST");
		assert_eq!(
			validate_request(&ResearchRequest::new("  retail media ", Depth::Quick)).unwrap(),
			"retail media"
		);
	}
}
