//! Balanced minimum-cost assignment.
//!
//! [`solve`] is the Hungarian method in its shortest-augmenting-path form
//! with row and column potentials, `O(n^3)`. [`naive_baseline`] is the greedy
//! cheapest-pair-first matching the optimizer reports for comparison only.

use serde::Serialize;

use crate::error::AssignmentError;
use crate::matrix::DistanceMatrix;

/// Cost used for padded cells in [`solve_rectangular`] by default.
pub const DEFAULT_SENTINEL_COST: f64 = 9999.0;

/// Bijection from agent index to task index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Assignment(Vec<usize>);

impl Assignment {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn task_of(&self, agent: usize) -> usize {
        self.0[agent]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// `(agent, task)` pairs in agent order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().copied().enumerate()
    }

    pub fn total_cost(&self, costs: &DistanceMatrix) -> f64 {
        total_cost(self, costs)
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

/// Pluggable matching strategy used by the optimizer.
pub trait AssignmentSolver: Send + Sync {
    fn solve(&self, costs: &DistanceMatrix) -> Result<Assignment, AssignmentError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl AssignmentSolver for HungarianSolver {
    fn solve(&self, costs: &DistanceMatrix) -> Result<Assignment, AssignmentError> {
        solve(costs)
    }
}

/// Sum of the chosen cells.
pub fn total_cost(assignment: &Assignment, costs: &DistanceMatrix) -> f64 {
    assignment
        .pairs()
        .map(|(agent, task)| costs.get(agent, task))
        .sum()
}

/// Minimum-cost perfect matching on a square matrix of finite costs.
pub fn solve(costs: &DistanceMatrix) -> Result<Assignment, AssignmentError> {
    validate(costs)?;
    let n = costs.rows();
    if n == 0 {
        return Ok(Assignment(Vec::new()));
    }

    // 1-based: row 0 / column 0 are the virtual source of each augmentation.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut task_owner = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for agent in 1..=n {
        task_owner[0] = agent;
        let mut j0 = 0;
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = task_owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let slack = costs.get(i0 - 1, j - 1) - u[i0] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[task_owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if task_owner[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path back to the source.
        loop {
            let j1 = way[j0];
            task_owner[j0] = task_owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut tasks = vec![0usize; n];
    for j in 1..=n {
        tasks[task_owner[j] - 1] = j - 1;
    }
    Ok(Assignment(tasks))
}

/// Result of matching a non-square matrix after padding it square.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaddedAssignment {
    pub assignment: Assignment,
    pub rows: usize,
    pub cols: usize,
}

impl PaddedAssignment {
    /// Task for a real agent, or `None` if it was matched to a padding column.
    pub fn real_match(&self, agent: usize) -> Option<usize> {
        if agent >= self.rows {
            return None;
        }
        let task = self.assignment.task_of(agent);
        (task < self.cols).then_some(task)
    }

    /// Real `(agent, task)` pairs, padding excluded.
    pub fn real_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows).filter_map(|agent| self.real_match(agent).map(|task| (agent, task)))
    }
}

/// Pads `costs` to square with `sentinel` before solving.
pub fn solve_rectangular(
    costs: &DistanceMatrix,
    sentinel: f64,
) -> Result<PaddedAssignment, AssignmentError> {
    let padded = costs.padded_square(sentinel);
    Ok(PaddedAssignment {
        assignment: solve(&padded)?,
        rows: costs.rows(),
        cols: costs.cols(),
    })
}

/// Greedy matching: repeatedly take the globally cheapest free pair.
///
/// Ties go to the lower agent, then the lower task. Not optimal in general.
pub fn naive_baseline(costs: &DistanceMatrix) -> Result<Assignment, AssignmentError> {
    validate(costs)?;
    let n = costs.rows();

    let mut cells: Vec<(usize, usize)> = (0..n)
        .flat_map(|agent| (0..n).map(move |task| (agent, task)))
        .collect();
    cells.sort_by(|a, b| costs.get(a.0, a.1).total_cmp(&costs.get(b.0, b.1)));

    let mut tasks: Vec<Option<usize>> = vec![None; n];
    let mut task_taken = vec![false; n];
    let mut matched = 0;
    for (agent, task) in cells {
        if matched == n {
            break;
        }
        if tasks[agent].is_some() || task_taken[task] {
            continue;
        }
        tasks[agent] = Some(task);
        task_taken[task] = true;
        matched += 1;
    }

    Ok(Assignment(tasks.into_iter().flatten().collect()))
}

fn validate(costs: &DistanceMatrix) -> Result<(), AssignmentError> {
    if !costs.is_square() {
        return Err(AssignmentError::NonSquare {
            rows: costs.rows(),
            cols: costs.cols(),
        });
    }
    for row in 0..costs.rows() {
        if let Some(col) = costs.row(row).iter().position(|c| !c.is_finite()) {
            return Err(AssignmentError::NonFinite { row, col });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> DistanceMatrix {
        DistanceMatrix::from_rows(rows).unwrap()
    }

    fn is_bijection(assignment: &Assignment, n: usize) -> bool {
        let mut seen = vec![false; n];
        assignment.len() == n
            && assignment.pairs().all(|(_, task)| {
                task < n && !std::mem::replace(&mut seen[task], true)
            })
    }

    #[test]
    fn test_empty_matrix() {
        let assignment = solve(&DistanceMatrix::new(0, 0, 0.0)).unwrap();
        assert!(assignment.is_empty());
        assert!(naive_baseline(&DistanceMatrix::new(0, 0, 0.0)).unwrap().is_empty());
    }

    #[test]
    fn test_classic_instance() {
        let costs = matrix(vec![
            vec![4.0, 1.0, 3.0],
            vec![2.0, 0.0, 5.0],
            vec![3.0, 2.0, 2.0],
        ]);
        let assignment = solve(&costs).unwrap();
        assert_eq!(assignment.as_slice(), &[1, 0, 2]);
        assert_eq!(assignment.total_cost(&costs), 5.0);
    }

    #[test]
    fn test_greedy_trap() {
        // Greedy grabs the 1.0 and is forced into 100.0.
        let costs = matrix(vec![vec![1.0, 2.0], vec![2.0, 100.0]]);
        let optimal = solve(&costs).unwrap();
        let naive = naive_baseline(&costs).unwrap();

        assert_eq!(optimal.as_slice(), &[1, 0]);
        assert_eq!(optimal.total_cost(&costs), 4.0);
        assert_eq!(naive.as_slice(), &[0, 1]);
        assert_eq!(naive.total_cost(&costs), 101.0);
    }

    #[test]
    fn test_all_equal_is_still_bijection() {
        let costs = DistanceMatrix::new(5, 5, 7.0);
        let assignment = solve(&costs).unwrap();
        assert!(is_bijection(&assignment, 5));
        assert_eq!(assignment.total_cost(&costs), 35.0);
    }

    #[test]
    fn test_rejects_non_square_and_non_finite() {
        let wide = DistanceMatrix::new(2, 3, 1.0);
        assert_eq!(solve(&wide), Err(AssignmentError::NonSquare { rows: 2, cols: 3 }));

        let mut costs = DistanceMatrix::new(2, 2, 1.0);
        costs.set(1, 0, f64::INFINITY);
        assert_eq!(solve(&costs), Err(AssignmentError::NonFinite { row: 1, col: 0 }));
    }

    #[test]
    fn test_rectangular_reports_padding_as_no_match() {
        // Three agents, two tasks: the most expensive agent is left over.
        let costs = matrix(vec![vec![1.0, 9.0], vec![50.0, 60.0], vec![9.0, 1.0]]);
        let padded = solve_rectangular(&costs, DEFAULT_SENTINEL_COST).unwrap();

        assert_eq!(padded.real_match(0), Some(0));
        assert_eq!(padded.real_match(1), None);
        assert_eq!(padded.real_match(2), Some(1));
        assert_eq!(padded.real_pairs().collect::<Vec<_>>(), vec![(0, 0), (2, 1)]);
    }

    #[test]
    fn test_rectangular_more_tasks_than_agents() {
        let costs = matrix(vec![vec![5.0, 1.0, 3.0]]);
        let padded = solve_rectangular(&costs, DEFAULT_SENTINEL_COST).unwrap();
        assert_eq!(padded.real_match(0), Some(1));
        assert_eq!(padded.real_match(1), None);
    }

    #[test]
    fn test_solver_trait_object() {
        let solver: Box<dyn AssignmentSolver> = Box::new(HungarianSolver);
        let costs = matrix(vec![vec![3.0, 1.0], vec![1.0, 3.0]]);
        assert_eq!(solver.solve(&costs).unwrap().as_slice(), &[1, 0]);
    }
}
