pub mod category_dto;

pub use category_dto::{
    CategoryListQuery, CategoryResponseDto, CreateCategoryDto, SortDirection, UpdateCategoryDto,
};
