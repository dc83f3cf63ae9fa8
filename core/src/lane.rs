use mbcrypt_backend::{Backend, Job, LaneSlot};

struct Occupant<B: Backend> {
    job: Job,
    cursor: usize,
    state: B::LaneState,
}

/// One slot of vector capacity: at most one in-flight job with its progress
/// cursor and running state.
pub struct Lane<B: Backend> {
    index: usize,
    occupant: Option<Occupant<B>>,
}

impl<B: Backend> Lane<B> {
    pub fn new(index: usize) -> Self {
        Self { index, occupant: None }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    /// Bytes the occupying job still needs, `None` if the lane is free.
    pub fn remaining(&self) -> Option<usize> {
        self.occupant
            .as_ref()
            .map(|occupant| occupant.job.len_bytes() - occupant.cursor)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.occupant.as_ref().map(|occupant| occupant.cursor)
    }

    pub fn job(&self) -> Option<&Job> {
        self.occupant.as_ref().map(|occupant| &occupant.job)
    }

    pub(crate) fn occupy(&mut self, mut job: Job, state: B::LaneState) {
        assert!(self.is_free(), "lane {} occupied twice", self.index);
        job.mark_in_lane();
        self.occupant = Some(Occupant { job, cursor: 0, state });
    }

    pub(crate) fn slot(&mut self) -> LaneSlot<'_, B> {
        match &mut self.occupant {
            None => LaneSlot::Inactive,
            Some(Occupant { job, cursor, state }) => {
                let (src, dst) = job.lane_spans();
                LaneSlot::Active {
                    state,
                    src,
                    dst,
                    offset: *cursor,
                }
            }
        }
    }

    /// Moves the cursor after a round and reports whether the job is done.
    pub(crate) fn advance(&mut self, len: usize) -> bool {
        match &mut self.occupant {
            None => false,
            Some(occupant) => {
                occupant.cursor += len;
                assert!(
                    occupant.cursor <= occupant.job.len_bytes(),
                    "lane {} advanced past the end of its job",
                    self.index
                );
                occupant.cursor == occupant.job.len_bytes()
            }
        }
    }

    /// Frees the lane, handing back the job and its running state.
    pub(crate) fn release(&mut self) -> Option<(Job, B::LaneState)> {
        self.occupant.take().map(|occupant| (occupant.job, occupant.state))
    }
}
