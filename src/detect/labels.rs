//! COCO instance category names, in torchvision output ordering.
//!
//! Mask R-CNN emits integer labels that index into this table. The table
//! keeps the `N/A` placeholder entries because the label space of the
//! pretrained COCO checkpoints is sparse.

/// Class name the dataset capture filters on.
pub const PERSON: &str = "person";

pub const COCO_INSTANCE_CATEGORIES: [&str; 91] = [
    "__background__",
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "N/A",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "N/A",
    "backpack",
    "umbrella",
    "N/A",
    "N/A",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "N/A",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "N/A",
    "dining table",
    "N/A",
    "N/A",
    "toilet",
    "N/A",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "N/A",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Look up a class name by model label. Out-of-range labels yield `None`.
pub fn class_name(label: u32) -> Option<&'static str> {
    COCO_INSTANCE_CATEGORIES.get(label as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_is_label_one() {
        assert_eq!(class_name(1), Some(PERSON));
    }

    #[test]
    fn out_of_range_label_has_no_name() {
        assert_eq!(class_name(91), None);
    }
}
