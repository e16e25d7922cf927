pub mod rectangle_annotator;
