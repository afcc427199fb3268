use crate::charts::ChartOptions;
use crate::error::Result;
use crate::table::ModelInputTable;
use plotly::Plot;
use std::collections::BTreeSet;

/// A reporting node function: consumes the input table, returns one figure
pub type NodeFunc = fn(&ModelInputTable, &ChartOptions) -> Result<Plot>;

/// One declared step: a function reference mapping a named input dataset to
/// a named output dataset
#[derive(Debug, Clone)]
pub struct Node {
    func: NodeFunc,
    func_name: &'static str,
    input: &'static str,
    output: &'static str,
}

impl Node {
    pub fn new(
        func: NodeFunc,
        func_name: &'static str,
        input: &'static str,
        output: &'static str,
    ) -> Self {
        Node {
            func,
            func_name,
            input,
            output,
        }
    }

    pub fn func_name(&self) -> &'static str {
        self.func_name
    }

    pub fn input(&self) -> &'static str {
        self.input
    }

    pub fn output(&self) -> &'static str {
        self.output
    }

    pub fn run(&self, table: &ModelInputTable, options: &ChartOptions) -> Result<Plot> {
        (self.func)(table, options)
    }
}

/// An ordered, declarative collection of nodes. Execution belongs to the
/// runner; this type only describes the wiring.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    nodes: Vec<Node>,
}

impl Pipeline {
    pub fn new(nodes: Vec<Node>) -> Self {
        Pipeline { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Distinct input dataset names, in stable order
    pub fn inputs(&self) -> Vec<&'static str> {
        let set: BTreeSet<&'static str> = self.nodes.iter().map(|n| n.input).collect();
        set.into_iter().collect()
    }

    /// Output dataset names in declaration order
    pub fn outputs(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|n| n.output).collect()
    }

    pub fn node_by_func_name(&self, func_name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.func_name == func_name)
    }

    pub fn node_by_output(&self, output: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.output == output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportingError;

    fn stub_chart(_table: &ModelInputTable, _options: &ChartOptions) -> Result<Plot> {
        Ok(Plot::new())
    }

    fn failing_chart(_table: &ModelInputTable, _options: &ChartOptions) -> Result<Plot> {
        Err(ReportingError::Chart("boom".to_string()))
    }

    #[test]
    fn accessors_expose_the_declared_wiring() {
        let pipeline = Pipeline::new(vec![
            Node::new(stub_chart, "stub_a", "table", "artifact_a"),
            Node::new(stub_chart, "stub_b", "table", "artifact_b"),
        ]);

        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.inputs(), vec!["table"]);
        assert_eq!(pipeline.outputs(), vec!["artifact_a", "artifact_b"]);
        assert_eq!(
            pipeline.node_by_output("artifact_b").unwrap().func_name(),
            "stub_b"
        );
        assert!(pipeline.node_by_func_name("missing").is_none());
    }

    #[test]
    fn run_dispatches_to_the_referenced_function() {
        let table = ModelInputTable::default();
        let options = ChartOptions::default();
        let ok = Node::new(stub_chart, "stub", "table", "out");
        let bad = Node::new(failing_chart, "failing", "table", "out");

        assert!(ok.run(&table, &options).is_ok());
        assert!(bad.run(&table, &options).is_err());
    }
}
