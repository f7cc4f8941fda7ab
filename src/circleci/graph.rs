use std::collections::{BTreeMap, HashMap};

use super::types::Job;
use crate::views::{GraphEdge, GraphLayout, GraphNode};

const COLUMN_SPACING: u32 = 220;
const ROW_SPACING: u32 = 80;
const PADDING_X: u32 = 40;
const PADDING_Y: u32 = 32;
const NODE_WIDTH: u32 = 160;
const NODE_HEIGHT: u32 = 40;
const MIN_CANVAS_WIDTH: u32 = 320;
const MIN_CANVAS_HEIGHT: u32 = 160;

/// Lays out a workflow's jobs as a left-to-right dependency graph.
///
/// A job's column is its depth: the longest path from any dependency-free
/// root. Rows within a column are ordered by job name, so the geometry is
/// a pure function of the job set and never of input order. Dependency ids
/// that don't resolve to a job in the collection are ignored. Cyclic input
/// is malformed but must not hang: a job revisited while its own depth is
/// being computed contributes depth 0 at that occurrence, which keeps the
/// traversal finite (the depths assigned to cycle members carry no further
/// meaning).
pub fn layout_graph(jobs: &[Job]) -> GraphLayout {
    if jobs.is_empty() {
        return GraphLayout {
            nodes: Vec::new(),
            edges: Vec::new(),
            width: MIN_CANVAS_WIDTH,
            height: MIN_CANVAS_HEIGHT,
        };
    }

    let index_by_id: HashMap<&str, usize> = jobs
        .iter()
        .enumerate()
        .map(|(index, job)| (job.id.as_str(), index))
        .collect();

    // Resolvable dependency indices per job, dangling ids dropped.
    let deps: Vec<Vec<usize>> = jobs
        .iter()
        .map(|job| {
            job.dependencies
                .iter()
                .filter_map(|dep_id| index_by_id.get(dep_id.as_str()).copied())
                .collect()
        })
        .collect();

    let depths = compute_depths(&deps);

    // Bucket by depth, order rows by (name, id) for a stable layout even
    // with duplicate job names.
    let mut columns: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, depth) in depths.iter().enumerate() {
        columns.entry(*depth).or_default().push(index);
    }
    for column in columns.values_mut() {
        column.sort_by(|&a, &b| {
            jobs[a]
                .name
                .cmp(&jobs[b].name)
                .then_with(|| jobs[a].id.cmp(&jobs[b].id))
        });
    }

    let mut nodes = Vec::with_capacity(jobs.len());
    let mut node_by_index: Vec<Option<GraphNode>> = vec![None; jobs.len()];
    for (&depth, column) in &columns {
        for (row, &index) in column.iter().enumerate() {
            let job = &jobs[index];
            let node = GraphNode {
                job_id: job.id.clone(),
                name: job.name.clone(),
                status: job.status,
                job_type: job.job_type,
                depth,
                row,
                x: PADDING_X + depth as u32 * COLUMN_SPACING,
                y: PADDING_Y + row as u32 * ROW_SPACING,
                started_at: job.started_at,
                stopped_at: job.stopped_at,
            };
            node_by_index[index] = Some(node.clone());
            nodes.push(node);
        }
    }

    // One edge per resolvable (dependency -> dependent) pair, walked in
    // node layout order so the edge list is as deterministic as the nodes.
    let mut edges = Vec::new();
    for node in &nodes {
        let index = index_by_id[node.job_id.as_str()];
        for &dep in &deps[index] {
            let from = node_by_index[dep].clone().expect("all jobs are laid out");
            edges.push(GraphEdge {
                from,
                to: node.clone(),
            });
        }
    }

    let max_depth = *columns.keys().next_back().unwrap_or(&0);
    let tallest_column = columns.values().map(Vec::len).max().unwrap_or(0);

    let width = (PADDING_X * 2 + max_depth as u32 * COLUMN_SPACING + NODE_WIDTH)
        .max(MIN_CANVAS_WIDTH);
    let height = (PADDING_Y * 2 + tallest_column.saturating_sub(1) as u32 * ROW_SPACING
        + NODE_HEIGHT)
        .max(MIN_CANVAS_HEIGHT);

    GraphLayout {
        nodes,
        edges,
        width,
        height,
    }
}

#[derive(Clone, Copy)]
struct Frame {
    node: usize,
    next_dep: usize,
    best: usize,
}

/// Longest-path depth per job, memoized, with an explicit stack and
/// in-progress marks instead of call-stack recursion.
fn compute_depths(deps: &[Vec<usize>]) -> Vec<usize> {
    let len = deps.len();
    let mut depths: Vec<Option<usize>> = vec![None; len];
    let mut in_progress = vec![false; len];

    for start in 0..len {
        if depths[start].is_some() {
            continue;
        }
        in_progress[start] = true;
        let mut stack = vec![Frame {
            node: start,
            next_dep: 0,
            best: 0,
        }];

        while let Some(mut frame) = stack.pop() {
            let node_deps = &deps[frame.node];
            let mut descended = false;

            while frame.next_dep < node_deps.len() {
                let dep = node_deps[frame.next_dep];
                if let Some(depth) = depths[dep] {
                    frame.best = frame.best.max(depth + 1);
                    frame.next_dep += 1;
                } else if in_progress[dep] {
                    // Revisit on the current path: the cycle member counts
                    // as depth 0 for this occurrence.
                    frame.best = frame.best.max(1);
                    frame.next_dep += 1;
                } else {
                    in_progress[dep] = true;
                    stack.push(frame);
                    stack.push(Frame {
                        node: dep,
                        next_dep: 0,
                        best: 0,
                    });
                    descended = true;
                    break;
                }
            }

            if !descended {
                depths[frame.node] = Some(frame.best);
                in_progress[frame.node] = false;
            }
        }
    }

    depths.into_iter().map(|d| d.unwrap_or(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circleci::status::Status;
    use crate::circleci::types::JobType;

    fn job(id: &str, name: &str, deps: &[&str]) -> Job {
        Job {
            id: id.to_string(),
            name: name.to_string(),
            status: Status::Success,
            job_type: JobType::Build,
            started_at: None,
            stopped_at: None,
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn node<'a>(layout: &'a GraphLayout, id: &str) -> &'a GraphNode {
        layout
            .nodes
            .iter()
            .find(|n| n.job_id == id)
            .unwrap_or_else(|| panic!("node {id} missing"))
    }

    #[test]
    fn job_without_dependencies_has_depth_zero() {
        let layout = layout_graph(&[job("a", "build", &[])]);
        assert_eq!(node(&layout, "a").depth, 0);
        assert_eq!(node(&layout, "a").row, 0);
    }

    #[test]
    fn depth_is_longest_path_not_shortest() {
        // d depends on both a (depth 0) and c (depth 2); longest path wins.
        let jobs = vec![
            job("a", "a", &[]),
            job("b", "b", &["a"]),
            job("c", "c", &["b"]),
            job("d", "d", &["a", "c"]),
        ];
        let layout = layout_graph(&jobs);
        assert_eq!(node(&layout, "a").depth, 0);
        assert_eq!(node(&layout, "b").depth, 1);
        assert_eq!(node(&layout, "c").depth, 2);
        assert_eq!(node(&layout, "d").depth, 3);
    }

    #[test]
    fn dangling_dependency_ids_are_ignored() {
        let jobs = vec![job("a", "a", &["ghost", "phantom"])];
        let layout = layout_graph(&jobs);
        assert_eq!(node(&layout, "a").depth, 0);
        assert!(layout.edges.is_empty());
    }

    #[test]
    fn rows_sort_by_name_within_a_column() {
        let jobs = vec![
            job("1", "zeta", &[]),
            job("2", "alpha", &[]),
            job("3", "mid", &[]),
        ];
        let layout = layout_graph(&jobs);
        assert_eq!(node(&layout, "2").row, 0);
        assert_eq!(node(&layout, "3").row, 1);
        assert_eq!(node(&layout, "1").row, 2);
    }

    #[test]
    fn layout_is_independent_of_input_order() {
        let jobs = vec![
            job("a", "build", &[]),
            job("b", "test", &["a"]),
            job("c", "lint", &["a"]),
            job("d", "deploy", &["b", "c"]),
        ];
        let mut reversed = jobs.clone();
        reversed.reverse();

        assert_eq!(layout_graph(&jobs), layout_graph(&reversed));
    }

    #[test]
    fn pixel_positions_follow_depth_and_row() {
        let jobs = vec![job("a", "a", &[]), job("b", "b", &["a"]), job("c", "c", &[])];
        let layout = layout_graph(&jobs);

        let a = node(&layout, "a");
        assert_eq!(a.x, PADDING_X);
        assert_eq!(a.y, PADDING_Y);

        let c = node(&layout, "c");
        assert_eq!(c.x, PADDING_X);
        assert_eq!(c.y, PADDING_Y + ROW_SPACING);

        let b = node(&layout, "b");
        assert_eq!(b.x, PADDING_X + COLUMN_SPACING);
        assert_eq!(b.y, PADDING_Y);
    }

    #[test]
    fn edges_carry_both_endpoint_snapshots() {
        let jobs = vec![job("a", "a", &[]), job("b", "b", &["a"])];
        let layout = layout_graph(&jobs);

        assert_eq!(layout.edges.len(), 1);
        let edge = &layout.edges[0];
        assert_eq!(edge.from.job_id, "a");
        assert_eq!(edge.to.job_id, "b");
        assert_eq!(edge.from.x, node(&layout, "a").x);
        assert_eq!(edge.to.depth, 1);
    }

    #[test]
    fn mutual_dependency_terminates_with_finite_depths() {
        let jobs = vec![job("a", "a", &["b"]), job("b", "b", &["a"])];
        let layout = layout_graph(&jobs);

        // Exact depths for cyclic input are unspecified; it only must not
        // hang and must keep every node.
        assert_eq!(layout.nodes.len(), 2);
        assert!(layout.nodes.iter().all(|n| n.depth <= 2));
    }

    #[test]
    fn self_dependency_terminates() {
        let layout = layout_graph(&[job("a", "a", &["a"])]);
        assert_eq!(layout.nodes.len(), 1);
    }

    #[test]
    fn empty_graph_still_has_floor_dimensions() {
        let layout = layout_graph(&[]);
        assert!(layout.nodes.is_empty());
        assert_eq!(layout.width, MIN_CANVAS_WIDTH);
        assert_eq!(layout.height, MIN_CANVAS_HEIGHT);
    }

    #[test]
    fn canvas_grows_with_depth_and_column_height() {
        let wide = layout_graph(&[
            job("a", "a", &[]),
            job("b", "b", &["a"]),
            job("c", "c", &["b"]),
        ]);
        assert_eq!(
            wide.width,
            PADDING_X * 2 + 2 * COLUMN_SPACING + NODE_WIDTH
        );

        let tall = layout_graph(&[job("a", "a", &[]), job("b", "b", &[]), job("c", "c", &[])]);
        assert_eq!(
            tall.height,
            (PADDING_Y * 2 + 2 * ROW_SPACING + NODE_HEIGHT).max(MIN_CANVAS_HEIGHT)
        );
    }
}
