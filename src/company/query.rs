pub const INSERT_COMPANY: &str = "
    INSERT INTO companies (handle, name, description, num_employees, logo_url)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING handle, name, description, num_employees AS \"numEmployees\", logo_url AS \"logoUrl\"
";

pub const GET_COMPANY_HANDLE: &str = "
    SELECT handle
    FROM companies
    WHERE handle = $1
";

pub const GET_ALL_COMPANIES: &str = "
    SELECT handle, name, description, num_employees AS \"numEmployees\", logo_url AS \"logoUrl\"
    FROM companies
    ORDER BY name
";

pub const GET_COMPANY_BY_HANDLE: &str = "
    SELECT handle, name, description, num_employees AS \"numEmployees\", logo_url AS \"logoUrl\"
    FROM companies
    WHERE handle = $1
";

pub const GET_COMPANY_JOBS: &str = "
    SELECT id, title, salary, equity
    FROM jobs
    WHERE company_handle = $1
    ORDER BY id
";

pub const UPDATE_COMPANY_RETURNING: &str =
    "RETURNING handle, name, description, num_employees AS \"numEmployees\", logo_url AS \"logoUrl\"";

pub const DELETE_COMPANY: &str = "
    DELETE
    FROM companies
    WHERE handle = $1
";
