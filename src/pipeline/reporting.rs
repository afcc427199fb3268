use crate::charts::{
    make_cancel_policy_bar_chart, make_price_analysis_image, make_price_histogram,
};
use crate::common::constants;
use crate::pipeline::node::{Node, Pipeline};

/// Declare the reporting pipeline: three chart nodes over the model input table.
pub fn create_pipeline() -> Pipeline {
    Pipeline::new(vec![
        Node::new(
            make_cancel_policy_bar_chart,
            constants::MAKE_CANCEL_POLICY_BAR_CHART,
            constants::MODEL_INPUT_TABLE,
            constants::CANCELLATION_POLICY_BREAKDOWN,
        ),
        Node::new(
            make_price_histogram,
            constants::MAKE_PRICE_HISTOGRAM,
            constants::MODEL_INPUT_TABLE,
            constants::PRICE_HISTOGRAM,
        ),
        Node::new(
            make_price_analysis_image,
            constants::MAKE_PRICE_ANALYSIS_IMAGE,
            constants::MODEL_INPUT_TABLE,
            constants::CANCELLATION_POLICY_GRID,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_exactly_three_nodes() {
        assert_eq!(create_pipeline().len(), 3);
    }

    #[test]
    fn every_node_reads_the_model_input_table() {
        assert_eq!(
            create_pipeline().inputs(),
            vec![constants::MODEL_INPUT_TABLE]
        );
    }

    #[test]
    fn outputs_are_distinct_chart_artifacts() {
        let outputs = create_pipeline().outputs();
        assert_eq!(outputs, constants::chart_outputs());
    }
}
