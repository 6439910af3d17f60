//! Pure validation rules. Nothing in here touches the store or the clock;
//! callers pass in what they loaded and the instant to judge against.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::Rejection;
use crate::model::{
    api::ballot::ProposedVote,
    common::{BallotType, VoteType},
    db::{Ballot, Election, EligibleVoter},
    mongodb::Id,
};

/// A vote that has passed every rule for its ballot.
///
/// Can only be produced by [`validate_votes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidVote {
    ballot_id: Id,
    candidate_id: Option<Id>,
    vote_type: VoteType,
}

impl ValidVote {
    pub fn ballot_id(&self) -> Id {
        self.ballot_id
    }

    pub fn candidate_id(&self) -> Option<Id> {
        self.candidate_id
    }

    pub fn vote_type(&self) -> VoteType {
        self.vote_type
    }
}

/// The shape of a ballot, which decides the legal vote types.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum BallotShape {
    Referendum,
    /// At most one candidate: approve or oppose them.
    SingleCandidate,
    MultiCandidate,
}

impl BallotShape {
    fn of(ballot: &Ballot) -> Self {
        match ballot.ballot_type {
            BallotType::Referendum => Self::Referendum,
            _ if ballot.candidates.len() <= 1 => Self::SingleCandidate,
            _ => Self::MultiCandidate,
        }
    }
}

/// Can this voter vote in this election right now?
///
/// Returns the voter on success. A missing election is the caller's concern,
/// since only the caller knows the requested ID.
pub fn check_eligibility<'v>(
    election: &Election,
    voter: Option<&'v EligibleVoter>,
    now: DateTime<Utc>,
) -> Result<&'v EligibleVoter, Rejection> {
    if !election.active {
        return Err(Rejection::ElectionInactive(election.id));
    }
    let voter = voter.ok_or(Rejection::NotEligible(election.id))?;
    if voter.has_voted {
        return Err(Rejection::AlreadyVoted(election.id));
    }
    if now < election.start_time {
        return Err(Rejection::ElectionNotStarted(election.start_time));
    }
    if election.has_ended(now) {
        return Err(Rejection::ElectionEnded(election.end_time));
    }
    Ok(voter)
}

/// Validate a full submission against the election's ballots.
///
/// Eligibility is assumed to have been checked already. The first failure
/// rejects the whole submission.
pub fn validate_votes(
    election: &Election,
    ballots: &[Ballot],
    voter: &EligibleVoter,
    votes: &[ProposedVote],
) -> Result<Vec<ValidVote>, Rejection> {
    if votes.is_empty() {
        return Err(Rejection::EmptySubmission);
    }
    let mut seen = HashSet::new();
    for vote in votes {
        if !seen.insert(vote.ballot_id) {
            return Err(Rejection::DuplicateBallot(vote.ballot_id));
        }
    }

    votes
        .iter()
        .map(|vote| {
            let ballot = ballots
                .iter()
                .find(|b| b.id == vote.ballot_id && b.election_id == election.id)
                .ok_or(Rejection::BallotNotFound(vote.ballot_id))?;
            validate_vote(ballot, voter, vote)
        })
        .collect()
}

fn validate_vote(
    ballot: &Ballot,
    voter: &EligibleVoter,
    vote: &ProposedVote,
) -> Result<ValidVote, Rejection> {
    if let Some(college) = ballot.ballot_type.college() {
        if college != voter.college {
            return Err(Rejection::InvalidCollege {
                ballot_id: ballot.id,
                college: college.to_string(),
            });
        }
    }

    check_shape(BallotShape::of(ballot), ballot.id, vote)?;

    if let Some(candidate_id) = vote.candidate_id {
        if ballot.candidate(candidate_id).is_none() {
            return Err(Rejection::CandidateNotFound {
                ballot_id: ballot.id,
                candidate_id,
            });
        }
    }

    Ok(ValidVote {
        ballot_id: ballot.id,
        candidate_id: vote.candidate_id,
        vote_type: vote.vote_type,
    })
}

fn check_shape(shape: BallotShape, ballot_id: Id, vote: &ProposedVote) -> Result<(), Rejection> {
    use BallotShape::*;
    use VoteType::*;

    let vote_type = vote.vote_type;
    let invalid_type = Rejection::InvalidVoteType { ballot_id, vote_type };
    let required = Rejection::CandidateRequired { ballot_id, vote_type };
    let not_allowed = Rejection::CandidateNotAllowed { ballot_id, vote_type };

    match (shape, vote_type, vote.candidate_id.is_some()) {
        (_, Abstain, false) => Ok(()),
        (_, Abstain, true) => Err(not_allowed),

        (Referendum, Yes | No, false) => Ok(()),
        (Referendum, Yes | No, true) => Err(not_allowed),
        (Referendum, Candidate | Approve | Oppose, _) => Err(invalid_type),

        (SingleCandidate, Candidate | Approve | Oppose, true) => Ok(()),
        (SingleCandidate, Candidate | Approve | Oppose, false) => Err(required),
        (SingleCandidate, Yes | No, _) => Err(invalid_type),

        (MultiCandidate, Candidate, true) => Ok(()),
        (MultiCandidate, Candidate, false) => Err(required),
        (MultiCandidate, Yes | No | Approve | Oppose, _) => Err(invalid_type),
    }
}

/// The ballots a voter from the given college may vote on, in presentation
/// order: by category, then creation time, then ID.
pub fn eligible_ballots(mut ballots: Vec<Ballot>, college: &str) -> Vec<Ballot> {
    ballots.retain(|ballot| ballot.ballot_type.admits(college));
    sort_for_presentation(&mut ballots);
    ballots
}

pub(crate) fn sort_for_presentation(ballots: &mut [Ballot]) {
    ballots.sort_by_key(|ballot| (ballot.category(), ballot.created_at, ballot.id));
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::voting::RejectionKind;

    const COLLEGE: &str = "Science";

    struct Fixture {
        election: Election,
        voter: EligibleVoter,
        referendum: Ballot,
        single: Ballot,
        multi: Ballot,
        director: Ballot,
        other_director: Ballot,
    }

    impl Fixture {
        fn new() -> Self {
            let election = Election::open_example();
            let eid = election.id;
            Self {
                voter: EligibleVoter::example(eid, "alice@example.com", COLLEGE),
                referendum: Ballot::referendum_example(eid),
                single: Ballot::uncontested_example(eid),
                multi: Ballot::executive_example(eid),
                director: Ballot::director_example(eid, COLLEGE),
                other_director: Ballot::director_example(eid, "Arts"),
                election,
            }
        }

        fn ballots(&self) -> Vec<Ballot> {
            vec![
                self.referendum.clone(),
                self.single.clone(),
                self.multi.clone(),
                self.director.clone(),
                self.other_director.clone(),
            ]
        }

        fn validate(&self, votes: &[ProposedVote]) -> Result<Vec<ValidVote>, Rejection> {
            validate_votes(&self.election, &self.ballots(), &self.voter, votes)
        }

        fn kind(&self, votes: &[ProposedVote]) -> RejectionKind {
            self.validate(votes).unwrap_err().kind()
        }
    }

    #[test]
    fn eligible_voter_in_open_election() {
        let f = Fixture::new();
        let voter = check_eligibility(&f.election, Some(&f.voter), Utc::now()).unwrap();
        assert_eq!(voter.id, f.voter.id);
    }

    #[test]
    fn eligibility_failures() {
        let f = Fixture::new();
        let now = Utc::now();

        let mut inactive = f.election.clone();
        inactive.active = false;
        assert_eq!(
            check_eligibility(&inactive, Some(&f.voter), now),
            Err(Rejection::ElectionInactive(inactive.id))
        );

        assert_eq!(
            check_eligibility(&f.election, None, now),
            Err(Rejection::NotEligible(f.election.id))
        );

        let mut voted = f.voter.clone();
        voted.has_voted = true;
        assert_eq!(
            check_eligibility(&f.election, Some(&voted), now),
            Err(Rejection::AlreadyVoted(f.election.id))
        );

        let future = Election::future_example();
        assert_eq!(
            check_eligibility(&future, Some(&f.voter), now),
            Err(Rejection::ElectionNotStarted(future.start_time))
        );

        let past = Election::past_example();
        assert_eq!(
            check_eligibility(&past, Some(&f.voter), now),
            Err(Rejection::ElectionEnded(past.end_time))
        );
    }

    #[test]
    fn window_is_half_open() {
        let f = Fixture::new();
        let start = f.election.start_time;
        let end = f.election.end_time;

        assert!(check_eligibility(&f.election, Some(&f.voter), start).is_ok());
        assert!(check_eligibility(&f.election, Some(&f.voter), end - Duration::milliseconds(1)).is_ok());
        assert!(matches!(
            check_eligibility(&f.election, Some(&f.voter), start - Duration::milliseconds(1)),
            Err(Rejection::ElectionNotStarted(_))
        ));
        assert!(matches!(
            check_eligibility(&f.election, Some(&f.voter), end),
            Err(Rejection::ElectionEnded(_))
        ));
    }

    #[test]
    fn inactive_beats_other_failures() {
        let mut past = Election::past_example();
        past.active = false;
        assert!(matches!(
            check_eligibility(&past, None, Utc::now()),
            Err(Rejection::ElectionInactive(_))
        ));
    }

    #[test]
    fn submission_must_be_nonempty_and_unique() {
        let f = Fixture::new();
        assert_eq!(f.kind(&[]), RejectionKind::EmptySubmission);

        let vote = ProposedVote::new(f.referendum.id, VoteType::Yes, None);
        assert_eq!(
            f.validate(&[vote.clone(), vote]),
            Err(Rejection::DuplicateBallot(f.referendum.id))
        );
    }

    #[test]
    fn unknown_ballots_and_candidates() {
        let f = Fixture::new();
        let missing = Id::new();
        assert_eq!(
            f.validate(&[ProposedVote::new(missing, VoteType::Yes, None)]),
            Err(Rejection::BallotNotFound(missing))
        );

        // A ballot from another election is not found in this one.
        let foreign = Ballot::referendum_example(Id::new());
        let result = validate_votes(
            &f.election,
            &[foreign.clone()],
            &f.voter,
            &[ProposedVote::new(foreign.id, VoteType::Yes, None)],
        );
        assert_eq!(result, Err(Rejection::BallotNotFound(foreign.id)));

        let stranger = Id::new();
        assert_eq!(
            f.validate(&[ProposedVote::new(f.multi.id, VoteType::Candidate, stranger)]),
            Err(Rejection::CandidateNotFound {
                ballot_id: f.multi.id,
                candidate_id: stranger,
            })
        );

        // Candidates of one ballot are not valid on another.
        let elsewhere = f.single.candidates[0].id;
        assert_eq!(
            f.kind(&[ProposedVote::new(f.multi.id, VoteType::Candidate, elsewhere)]),
            RejectionKind::CandidateNotFound
        );
    }

    #[test]
    fn director_ballots_are_college_restricted() {
        let f = Fixture::new();
        let own = f.director.candidates[0].id;
        assert!(f
            .validate(&[ProposedVote::new(f.director.id, VoteType::Candidate, own)])
            .is_ok());

        let other = f.other_director.candidates[0].id;
        assert_eq!(
            f.validate(&[ProposedVote::new(f.other_director.id, VoteType::Candidate, other)]),
            Err(Rejection::InvalidCollege {
                ballot_id: f.other_director.id,
                college: "Arts".to_string(),
            })
        );

        // College names are compared exactly.
        let mut voter = f.voter.clone();
        voter.college = COLLEGE.to_lowercase();
        let result = validate_votes(
            &f.election,
            &f.ballots(),
            &voter,
            &[ProposedVote::new(f.director.id, VoteType::Candidate, own)],
        );
        assert!(matches!(result, Err(Rejection::InvalidCollege { .. })));
    }

    /// The legal (vote type, candidate present) pairs for each ballot shape.
    fn allowed(shape: BallotShape, vote_type: VoteType, with_candidate: bool) -> bool {
        use VoteType::*;
        match shape {
            BallotShape::Referendum => matches!(vote_type, Yes | No | Abstain) && !with_candidate,
            BallotShape::SingleCandidate => match vote_type {
                Abstain => !with_candidate,
                Candidate | Approve | Oppose => with_candidate,
                _ => false,
            },
            BallotShape::MultiCandidate => match vote_type {
                Abstain => !with_candidate,
                Candidate => with_candidate,
                _ => false,
            },
        }
    }

    #[test]
    fn decision_table_is_exhaustive() {
        let f = Fixture::new();
        let shapes = [
            (BallotShape::Referendum, &f.referendum),
            (BallotShape::SingleCandidate, &f.single),
            (BallotShape::MultiCandidate, &f.multi),
        ];

        for (shape, ballot) in shapes {
            assert_eq!(BallotShape::of(ballot), shape);
            // Referendums have no candidates of their own; borrow a real one so
            // the only thing under test is presence.
            let candidate = ballot
                .candidates
                .first()
                .map(|c| c.id)
                .unwrap_or(f.multi.candidates[0].id);

            for vote_type in VoteType::ALL {
                for with_candidate in [false, true] {
                    let vote = ProposedVote::new(
                        ballot.id,
                        vote_type,
                        with_candidate.then_some(candidate),
                    );
                    let result = f.validate(&[vote]);
                    if allowed(shape, vote_type, with_candidate) {
                        let valid = result.unwrap();
                        assert_eq!(valid.len(), 1);
                        assert_eq!(valid[0].vote_type(), vote_type);
                        assert_eq!(valid[0].candidate_id().is_some(), with_candidate);
                    } else {
                        let kind = result.unwrap_err().kind();
                        assert!(
                            matches!(
                                kind,
                                RejectionKind::InvalidVoteType
                                    | RejectionKind::CandidateRequired
                                    | RejectionKind::CandidateNotAllowed
                            ),
                            "{shape:?} {vote_type} {with_candidate} gave {kind:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn shape_failures_are_specific() {
        let f = Fixture::new();
        let multi_candidate = f.multi.candidates[0].id;
        let single_candidate = f.single.candidates[0].id;

        assert_eq!(
            f.kind(&[ProposedVote::new(f.referendum.id, VoteType::Candidate, None)]),
            RejectionKind::InvalidVoteType
        );
        assert_eq!(
            f.kind(&[ProposedVote::new(f.referendum.id, VoteType::Yes, multi_candidate)]),
            RejectionKind::CandidateNotAllowed
        );
        assert_eq!(
            f.kind(&[ProposedVote::new(f.multi.id, VoteType::Approve, multi_candidate)]),
            RejectionKind::InvalidVoteType
        );
        assert_eq!(
            f.kind(&[ProposedVote::new(f.multi.id, VoteType::Candidate, None)]),
            RejectionKind::CandidateRequired
        );
        assert_eq!(
            f.kind(&[ProposedVote::new(f.single.id, VoteType::Oppose, None)]),
            RejectionKind::CandidateRequired
        );
        assert_eq!(
            f.kind(&[ProposedVote::new(f.single.id, VoteType::Abstain, single_candidate)]),
            RejectionKind::CandidateNotAllowed
        );
        assert_eq!(
            f.kind(&[ProposedVote::new(f.single.id, VoteType::No, None)]),
            RejectionKind::InvalidVoteType
        );
    }

    #[test]
    fn one_bad_vote_rejects_the_submission() {
        let f = Fixture::new();
        let votes = [
            ProposedVote::new(f.referendum.id, VoteType::Yes, None),
            ProposedVote::new(f.multi.id, VoteType::Yes, None),
        ];
        assert_eq!(f.kind(&votes), RejectionKind::InvalidVoteType);
    }

    #[test]
    fn full_submission_is_accepted() {
        let f = Fixture::new();
        let votes = [
            ProposedVote::new(f.multi.id, VoteType::Candidate, f.multi.candidates[1].id),
            ProposedVote::new(f.single.id, VoteType::Approve, f.single.candidates[0].id),
            ProposedVote::new(f.director.id, VoteType::Abstain, None),
            ProposedVote::new(f.referendum.id, VoteType::No, None),
        ];
        let valid = f.validate(&votes).unwrap();
        let ballot_ids: Vec<_> = valid.iter().map(ValidVote::ballot_id).collect();
        assert_eq!(ballot_ids, votes.iter().map(|v| v.ballot_id).collect::<Vec<_>>());
    }

    #[test]
    fn ballots_are_listed_for_college_in_order() {
        let eid = Id::new();
        let referendum = Ballot::referendum_example(eid).created(-30);
        let late_exec = Ballot::executive_example(eid).created(10);
        let early_exec = Ballot::uncontested_example(eid).created(-10);
        let director = Ballot::director_example(eid, COLLEGE).created(-20);
        let other = Ballot::director_example(eid, "Arts");

        let listed = eligible_ballots(
            vec![
                referendum.clone(),
                late_exec.clone(),
                other,
                director.clone(),
                early_exec.clone(),
            ],
            COLLEGE,
        );
        let ids: Vec<_> = listed.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![early_exec.id, late_exec.id, director.id, referendum.id]);
    }

    #[test]
    fn ballot_ties_break_by_id() {
        let eid = Id::new();
        let first = Ballot::referendum_example(eid);
        let mut second = Ballot::referendum_example(eid);
        second.created_at = first.created_at;

        let listed = eligible_ballots(vec![second.clone(), first.clone()], COLLEGE);
        let mut expected = vec![first.id, second.id];
        expected.sort();
        assert_eq!(listed.iter().map(|b| b.id).collect::<Vec<_>>(), expected);
    }
}
