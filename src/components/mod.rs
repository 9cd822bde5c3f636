pub mod flavor_tree;
