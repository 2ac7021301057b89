use crate::swarm::{particle::Particle, rng::SharedRng, task::CancelToken};

/// Bounded set of non-dominated particle copies, the best trade-offs found
/// so far.
///
/// Insertion order is preserved, which makes the first-seen member win ties
/// when the representative best is selected.
#[derive(Clone, Debug, Default)]
pub struct ParetoArchive {
    members: Vec<Particle>,
    capacity: usize,
}

impl ParetoArchive {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            members: Vec::new(),
            capacity,
        }
    }

    /// Fold the swarm into the archive.
    ///
    /// A swarm particle dominated by any member is discarded; otherwise it
    /// evicts every member it dominates and joins. The cancellation flag is
    /// checked between particles. Over-capacity members are then evicted
    /// uniformly at random, with no preference for spread.
    pub(crate) fn absorb(&mut self, swarm: &[Particle], cancel: &CancelToken, rng: &SharedRng) {
        for particle in swarm {
            if cancel.is_cancelled() {
                break;
            }
            if self.members.iter().any(|member| member.dominates(particle)) {
                continue;
            }
            self.members.retain(|member| !particle.dominates(member));
            self.members.push(particle.clone());
        }

        while self.members.len() > self.capacity {
            let evict = rng.index(self.members.len());
            self.members.remove(evict);
        }
    }

    /// Whether `particle` sits at the same position as any member.
    pub(crate) fn contains_match(&self, particle: &Particle) -> bool {
        self.members.iter().any(|member| member.is_same(particle))
    }

    pub(crate) fn clear(&mut self) {
        self.members.clear();
    }

    pub(crate) fn reshape_members(&mut self, n_dim: usize, n_obj: usize) {
        for member in &mut self.members {
            member.reshape(n_dim, n_obj);
        }
    }

    pub fn members(&self) -> &[Particle] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
